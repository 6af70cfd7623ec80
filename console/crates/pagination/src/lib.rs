//! Pagination primitives shared by console list operations.
//!
//! List endpoints accept an opaque [`PageCursor`] in their query string and
//! return a [`PageMeta`] envelope describing the window that was served. The
//! cursor wraps a validated [`PageRequest`] so callers never hand-build page
//! numbers in URLs, and the server remains free to change the encoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest page number a request may carry (pages are one-based).
pub const PAGE_MIN: u32 = 1;
/// Smallest permitted page size.
pub const LIMIT_MIN: u32 = 1;
/// Largest permitted page size.
pub const LIMIT_MAX: u32 = 100;

/// Validation errors raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestValidationError {
    /// Page number was below [`PAGE_MIN`].
    #[error("page numbers start at {PAGE_MIN}")]
    PageOutOfRange,
    /// Page size fell outside `LIMIT_MIN..=LIMIT_MAX`.
    #[error("page size must be between {LIMIT_MIN} and {LIMIT_MAX}")]
    LimitOutOfRange,
}

/// Errors raised while encoding or decoding a [`PageCursor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageCursorError {
    /// The cursor payload could not be serialised.
    #[error("page cursor could not be encoded: {message}")]
    Encode {
        /// Serialiser failure description.
        message: String,
    },
    /// The cursor string was not valid base64 or hid an invalid payload.
    #[error("page cursor is not valid: {message}")]
    Decode {
        /// Decoder failure description.
        message: String,
    },
}

/// A validated request for one page of a list.
///
/// ## Invariants
/// - `page >= PAGE_MIN`
/// - `LIMIT_MIN <= limit <= LIMIT_MAX`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(2, 25).expect("valid window");
/// assert_eq!(request.page(), 2);
/// assert_eq!(request.limit(), 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Construct a request after validating the window bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestValidationError`] when either bound is out of
    /// range.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestValidationError> {
        if page < PAGE_MIN {
            return Err(PageRequestValidationError::PageOutOfRange);
        }
        if limit < LIMIT_MIN || limit > LIMIT_MAX {
            return Err(PageRequestValidationError::LimitOutOfRange);
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of records requested per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: PAGE_MIN,
            limit: 20,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PageRequestDto {
    page: u32,
    limit: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestValidationError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

/// Opaque, URL-safe cursor carrying a [`PageRequest`].
///
/// The wire form is unpadded URL-safe base64 over the JSON payload. Treat the
/// string as opaque: equality is the only meaningful client-side operation.
///
/// # Examples
/// ```
/// use pagination::{PageCursor, PageRequest};
///
/// let request = PageRequest::new(3, 10).expect("valid window");
/// let cursor = PageCursor::encode(request).expect("cursor encodes");
/// assert_eq!(cursor.decode().expect("cursor decodes"), request);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    /// Encode a page request into its opaque wire form.
    ///
    /// # Errors
    ///
    /// Returns [`PageCursorError::Encode`] when the payload cannot be
    /// serialised.
    pub fn encode(request: PageRequest) -> Result<Self, PageCursorError> {
        let payload = serde_json::to_vec(&request).map_err(|err| PageCursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(Self(URL_SAFE_NO_PAD.encode(payload)))
    }

    /// Decode the cursor back into the request it wraps.
    ///
    /// # Errors
    ///
    /// Returns [`PageCursorError::Decode`] when the string is not base64 or
    /// the payload fails [`PageRequest`] validation.
    pub fn decode(&self) -> Result<PageRequest, PageCursorError> {
        let payload = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|err| PageCursorError::Decode {
                message: err.to_string(),
            })?;
        serde_json::from_slice(&payload).map_err(|err| PageCursorError::Decode {
            message: err.to_string(),
        })
    }

    /// Borrow the opaque wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination envelope returned in list responses.
///
/// Mirrors the `meta.pagination` object of the API response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// One-based page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
    /// Total number of records across all pages.
    pub total: u64,
    /// Total number of pages at this limit.
    pub total_pages: u32,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}
