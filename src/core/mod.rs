pub mod byte_reader;
pub mod crypt;
pub mod decode;
pub mod document;
pub mod error;
pub mod lexer;
pub mod object;
pub mod object_index;
pub mod parser;
pub mod resources;

pub use byte_reader::{Bounds, ByteReader, Direction, SearchOptions};
pub use crypt::CryptInfo;
pub use document::DocumentData;
pub use error::{PDFError, PDFResult};
pub use lexer::{Lexer, ValueKind};
pub use object::{ChangeNotifier, ObjectId, PDFDict, PDFObject, PDFStream, StreamFilter};
pub use object_index::{IndexEntry, ObjectIndex, ObjectResolver, ParseInfo};
pub use parser::{ParsedValue, ValueParser};
pub use resources::{
    FontDict, GraphicsStateDict, ImageStream, ObjectMapDict, ResourceDict, XFormStream,
    XObjectStream,
};
