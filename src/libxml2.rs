//! LibXML2 RelaxNG FFI Wrapper Module
//!
//! Safe wrappers around the libxml2 RelaxNG API. The Rust XML crates parse and
//! query documents well but none of them validate against RelaxNG, so schema
//! compilation and validation go straight to libxml2.
//!
//! All calls happen on one thread. libxml2 is initialized exactly once; the
//! schema and each document handle are freed on drop.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Once;

use libc::{c_char, c_int, c_void};

use crate::error::{LibXml2Error, LibXml2Result};

static LIBXML2_INIT: Once = Once::new();

/// `XML_PARSE_NOENT | XML_PARSE_NOERROR | XML_PARSE_NOWARNING | XML_PARSE_NONET`
///
/// Entities from the internal subset are substituted; external DTDs are never loaded.
const READ_OPTIONS: c_int = (1 << 1) | (1 << 5) | (1 << 6) | (1 << 11);

// Opaque libxml2 structures
#[repr(C)]
pub struct XmlRelaxNg {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlRelaxNgParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlRelaxNgValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

#[repr(C)]
pub struct xmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *mut xmlError)>;

#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    pub fn xmlInitParser();

    // Document parsing
    pub fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);

    // RelaxNG schema parsing
    pub fn xmlRelaxNGNewParserCtxt(url: *const c_char) -> *mut XmlRelaxNgParserCtxt;
    pub fn xmlRelaxNGNewMemParserCtxt(
        buffer: *const c_char,
        size: c_int,
    ) -> *mut XmlRelaxNgParserCtxt;
    pub fn xmlRelaxNGSetParserStructuredErrors(
        ctxt: *mut XmlRelaxNgParserCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlRelaxNGParse(ctxt: *mut XmlRelaxNgParserCtxt) -> *mut XmlRelaxNg;
    pub fn xmlRelaxNGFreeParserCtxt(ctxt: *mut XmlRelaxNgParserCtxt);
    pub fn xmlRelaxNGFree(schema: *mut XmlRelaxNg);

    // RelaxNG validation
    pub fn xmlRelaxNGNewValidCtxt(schema: *mut XmlRelaxNg) -> *mut XmlRelaxNgValidCtxt;
    pub fn xmlRelaxNGFreeValidCtxt(ctxt: *mut XmlRelaxNgValidCtxt);
    pub fn xmlRelaxNGSetValidStructuredErrors(
        ctxt: *mut XmlRelaxNgValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlRelaxNGValidateDoc(ctxt: *mut XmlRelaxNgValidCtxt, doc: *mut XmlDoc) -> c_int;
}

/// Collects libxml2 structured error messages into the `Vec<String>` behind `user_data`
unsafe extern "C" fn structured_error_callback(user_data: *mut c_void, error: *mut xmlError) {
    if user_data.is_null() || error.is_null() {
        return;
    }
    let errors = unsafe { &mut *(user_data as *mut Vec<String>) };

    let msg_ptr = unsafe { (*error).message };
    if !msg_ptr.is_null() {
        let c_str = unsafe { CStr::from_ptr(msg_ptr) };
        let line = unsafe { (*error).line };
        let message = c_str.to_string_lossy();
        let message = message.trim();
        if line > 0 {
            errors.push(format!("line {}: {}", line, message));
        } else {
            errors.push(message.to_string());
        }
    }
}

/// Owned, compiled RelaxNG grammar
#[derive(Debug)]
pub struct RelaxNgSchema {
    ptr: *mut XmlRelaxNg,
    _phantom: PhantomData<XmlRelaxNg>,
}

impl RelaxNgSchema {
    /// # Safety
    ///
    /// `ptr` must come from `xmlRelaxNGParse` and not be freed elsewhere.
    unsafe fn from_raw(ptr: *mut XmlRelaxNg, errors: Vec<String>) -> LibXml2Result<Self> {
        if ptr.is_null() {
            let details = if errors.is_empty() {
                "no diagnostics reported".to_string()
            } else {
                errors.join("; ")
            };
            return Err(LibXml2Error::SchemaParseFailed { details });
        }

        Ok(RelaxNgSchema {
            ptr,
            _phantom: PhantomData,
        })
    }

    fn as_ptr(&self) -> *mut XmlRelaxNg {
        self.ptr
    }
}

impl Drop for RelaxNgSchema {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlRelaxNGFree(self.ptr);
            }
            self.ptr = std::ptr::null_mut();
        }
    }
}

/// Owned libxml2 document tree
struct XmlDocHandle {
    ptr: *mut XmlDoc,
}

impl Drop for XmlDocHandle {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                xmlFreeDoc(self.ptr);
            }
        }
    }
}

/// Validation result from libxml2
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation succeeded (return code 0)
    Valid,
    /// Validation failed with errors (return code > 0)
    Invalid {
        error_count: i32,
        errors: Vec<String>,
    },
    /// Internal error occurred (return code < 0)
    InternalError { code: i32 },
}

impl ValidationResult {
    /// Create ValidationResult from libxml2 return code and captured errors
    pub fn from_code(code: c_int, errors: Vec<String>) -> Self {
        match code {
            0 => ValidationResult::Valid,
            n if n > 0 => ValidationResult::Invalid {
                error_count: n,
                errors,
            },
            n => ValidationResult::InternalError { code: n },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationResult::InternalError { .. })
    }
}

/// Entry point to libxml2; constructing one initializes the library
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl LibXml2Wrapper {
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });

        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Compile a RelaxNG grammar from a file. Relative `include` and
    /// `externalRef` targets resolve against the file's location.
    pub fn parse_relaxng_from_file(&self, path: &Path) -> LibXml2Result<RelaxNgSchema> {
        let c_path = path_to_cstring(path)?;

        unsafe {
            let parser_ctxt = xmlRelaxNGNewParserCtxt(c_path.as_ptr());
            self.parse_with_context(parser_ctxt)
        }
    }

    /// Compile a RelaxNG grammar from an in-memory buffer
    pub fn parse_relaxng_from_memory(&self, schema_data: &[u8]) -> LibXml2Result<RelaxNgSchema> {
        let size = buffer_len(schema_data)?;

        unsafe {
            let parser_ctxt =
                xmlRelaxNGNewMemParserCtxt(schema_data.as_ptr() as *const c_char, size);
            self.parse_with_context(parser_ctxt)
        }
    }

    /// # Safety
    ///
    /// `parser_ctxt` must be null or a fresh context from one of the
    /// `xmlRelaxNGNew*ParserCtxt` constructors; it is freed here.
    unsafe fn parse_with_context(
        &self,
        parser_ctxt: *mut XmlRelaxNgParserCtxt,
    ) -> LibXml2Result<RelaxNgSchema> {
        if parser_ctxt.is_null() {
            return Err(LibXml2Error::ParserContextFailed);
        }

        let mut errors: Vec<String> = Vec::new();
        let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;

        unsafe {
            xmlRelaxNGSetParserStructuredErrors(
                parser_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );
            let schema_ptr = xmlRelaxNGParse(parser_ctxt);
            xmlRelaxNGFreeParserCtxt(parser_ctxt);

            RelaxNgSchema::from_raw(schema_ptr, errors)
        }
    }

    /// Validate an XML document held in memory against a compiled grammar.
    ///
    /// `name` is used as the document URL in libxml2 and in error values.
    pub fn validate_memory(
        &self,
        schema: &RelaxNgSchema,
        xml_content: &[u8],
        name: &str,
    ) -> LibXml2Result<ValidationResult> {
        let size = buffer_len(xml_content)?;
        let c_name = CString::new(name).map_err(|_| LibXml2Error::DocumentReadFailed {
            name: name.to_string(),
        })?;

        unsafe {
            let doc = XmlDocHandle {
                ptr: xmlReadMemory(
                    xml_content.as_ptr() as *const c_char,
                    size,
                    c_name.as_ptr(),
                    std::ptr::null(),
                    READ_OPTIONS,
                ),
            };
            if doc.ptr.is_null() {
                return Err(LibXml2Error::DocumentReadFailed {
                    name: name.to_string(),
                });
            }

            let valid_ctxt = xmlRelaxNGNewValidCtxt(schema.as_ptr());
            if valid_ctxt.is_null() {
                return Err(LibXml2Error::ValidationContextCreationFailed);
            }

            let mut errors: Vec<String> = Vec::new();
            let errors_ptr = &mut errors as *mut Vec<String> as *mut c_void;
            xmlRelaxNGSetValidStructuredErrors(
                valid_ctxt,
                Some(structured_error_callback),
                errors_ptr,
            );

            let result_code = xmlRelaxNGValidateDoc(valid_ctxt, doc.ptr);
            xmlRelaxNGFreeValidCtxt(valid_ctxt);

            Ok(ValidationResult::from_code(result_code, errors))
        }
    }
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

fn buffer_len(data: &[u8]) -> LibXml2Result<c_int> {
    c_int::try_from(data.len()).map_err(|_| LibXml2Error::InputTooLarge { len: data.len() })
}

fn path_to_cstring(path: &Path) -> LibXml2Result<CString> {
    path.to_str()
        .and_then(|s| CString::new(s).ok())
        .ok_or_else(|| LibXml2Error::InvalidPath {
            path: path.to_path_buf(),
        })
}
