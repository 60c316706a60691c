pub mod core;

// Re-export main types for convenience
pub use core::{
    Bounds, ByteReader, ChangeNotifier, CryptInfo, Direction, DocumentData, Lexer, ObjectId,
    ObjectIndex, ObjectResolver, PDFDict, PDFError, PDFObject, PDFResult, PDFStream, ParseInfo,
    ResourceDict, SearchOptions, ValueKind, ValueParser,
};
