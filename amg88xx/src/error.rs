// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross
#[cfg(feature = "std")]
extern crate std;

use core::fmt;

/// Errors that don't involve the transport.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LibraryError {
    /// The handle has no transport bound to it.
    InvalidHandle,

    /// The handle has not been initialized (or has been deinitialized).
    NotInitialized,

    /// A required link was missing when initializing. The message names the missing link.
    Configuration(&'static str),

    /// When a value from the sensor is malformed in some way.
    InvalidData(&'static str),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::InvalidHandle => write!(f, "handle has no interface"),
            LibraryError::NotInitialized => write!(f, "handle is not initialized"),
            LibraryError::Configuration(msg) => write!(f, "{} is not linked", msg),
            LibraryError::InvalidData(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LibraryError {}

/// The error type for the driver, generic over the [interface's][crate::Interface] error type.
#[derive(Clone, PartialEq)]
pub enum Error<E> {
    /// Errors originating from the transport (bus open/close, register reads and writes).
    Transport(E),

    /// Errors originating from within this library.
    Library(LibraryError),
}

// Custom Debug implementation so the variants read the same as the Display output.
impl<E> fmt::Debug for Error<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => f.debug_tuple("Error::Transport").field(err).finish(),
            Error::Library(err) => f.debug_tuple("Error::Library").field(err).finish(),
        }
    }
}

impl<E> fmt::Display for Error<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "Transport Error: {:?}", err),
            Error::Library(err) => write!(f, "Library Error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err),
            Error::Library(lib_err) => Some(lib_err),
        }
    }
}

impl<E> From<LibraryError> for Error<E> {
    fn from(lib_err: LibraryError) -> Self {
        Self::Library(lib_err)
    }
}

impl<E> Error<E> {
    /// The library error, if this isn't a transport error.
    pub fn library_error(&self) -> Option<&LibraryError> {
        match self {
            Error::Library(err) => Some(err),
            Error::Transport(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
