// MIT LICENSE
//
// Copyright (c) 2021 Dash Core Group
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use crate::Version;

/// Errors raised by trees and import sessions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Session errors
    #[error("import precondition failed: {0}")]
    Precondition(String),

    #[error("no import in progress")]
    NoActiveImport,

    #[error("invalid export node: {0}")]
    InvalidRecord(String),

    #[error("structural invariant violation: {0}")]
    StructuralInvariantViolation(String),

    #[error("invalid node structure, found stack size {0} when committing")]
    MalformedImportStructure(usize),

    // Tree errors
    #[error("version {0} does not exist")]
    VersionNotFound(Version),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("ed error: {0}")]
    EdError(ed::Error),

    #[error("storage error: {0}")]
    StorageError(avlplus_storage::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
