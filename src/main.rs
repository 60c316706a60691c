use pdf_cos::{DocumentData, PDFObject};
use std::env;
use std::process::ExitCode;

/// Command-line inspector for the COS object layer.
///
/// Usage:
///   cos-inspect <file.pdf>              print trailer and object table
///   cos-inspect <file.pdf> <object-nr>  re-serialize one object
fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cos-inspect <file.pdf> [object-number]");
        return ExitCode::FAILURE;
    }

    let data = match std::fs::read(&args[1]) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args[1], e);
            return ExitCode::FAILURE;
        }
    };
    let size = data.len();

    let doc = match DocumentData::open(data) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Failed to open {}: {}", args[1], e);
            return ExitCode::FAILURE;
        }
    };

    match args.get(2).map(|a| a.parse::<u32>()) {
        Some(Ok(id)) => print_object(&doc, id),
        Some(Err(_)) => {
            eprintln!("Object number must be an integer: {}", args[2]);
            ExitCode::FAILURE
        }
        None => print_summary(&doc, &args[1], size),
    }
}

fn print_summary(doc: &DocumentData, path: &str, size: usize) -> ExitCode {
    println!("{} ({} bytes)", path, size);
    println!("Indexed objects: {}", doc.index().len());

    if let Some(trailer) = doc.trailer() {
        println!("Trailer:");
        for (key, value) in trailer.iter() {
            match value.to_bytes(None) {
                Ok(bytes) => println!("  {} {}", key, String::from_utf8_lossy(&bytes)),
                Err(e) => println!("  {} <unserializable: {}>", key, e),
            }
        }
    } else {
        println!("No trailer dictionary");
    }

    println!("Objects:");
    for id in doc.index().ids() {
        let kind = match doc.object(id) {
            Some(PDFObject::Dict(d)) => match d.get_name("/Type") {
                Some(ty) => format!("dict {}", ty),
                None => "dict".to_string(),
            },
            Some(PDFObject::Stream(s)) => format!("stream ({} bytes)", s.data().len()),
            Some(PDFObject::Array(items)) => format!("array [{}]", items.len()),
            Some(PDFObject::Number(n)) => format!("number {}", n),
            Some(other) => format!("{:?}", other),
            None => "unparsable".to_string(),
        };
        println!("  {:>6}: {}", id, kind);
    }
    ExitCode::SUCCESS
}

fn print_object(doc: &DocumentData, id: u32) -> ExitCode {
    let Some(object) = doc.object(id) else {
        eprintln!("Object {} not found", id);
        return ExitCode::FAILURE;
    };
    match object.to_bytes(None) {
        Ok(bytes) => {
            println!("{}", String::from_utf8_lossy(&bytes));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cannot serialize object {}: {}", id, e);
            ExitCode::FAILURE
        }
    }
}
