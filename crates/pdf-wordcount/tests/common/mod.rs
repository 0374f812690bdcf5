#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use lemma_lexicon::{LoadMode, Lexicon};
use lemma_tagger::Tagger;
use lemma_types::{Annotator, Language};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdf_wordcount::{ModelConfig, ModelRegistry};

pub const FR_LEXICON: &str = "le\tle\tDET\t100\n\
    la\tle\tDET\t100\n\
    les\tle\tDET\t100\n\
    chat\tchat\tNOUN\t10\n\
    mange\tmanger\tVERB\t6\n\
    mange\tmange\tNOUN\t1\n\
    mangent\tmanger\tVERB\t3\n\
    petit\tpetit\tADJ\t5\n\
    fois\tfois\tNOUN\t5\n";

/// Page texts of the French sample document.
pub const FR_PAGES: [&str; 2] = [
    "Le chat mange. Les chats mangent!",
    "Le petit chat mange 2024 fois.",
];

/// Build a PDF with one Courier text line per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let raw: Vec<&[u8]> = pages.iter().map(|page| page.as_bytes()).collect();
    pdf_with_encoded_pages(&raw)
}

/// Like [`pdf_with_pages`], with page strings already in WinAnsi bytes.
pub fn pdf_with_encoded_pages(pages: &[&[u8]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text.to_vec())]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(kids.len() as i64),
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn french_tagger() -> Arc<dyn Annotator> {
    Arc::new(Tagger::new(
        Language::Fr,
        Lexicon::from_bytes(FR_LEXICON).unwrap(),
    ))
}

/// Registry with French preloaded and German left to `model_dir`, which has no models.
pub fn french_only_registry(model_dir: &Path) -> ModelRegistry {
    ModelRegistry::preloaded(
        ModelConfig {
            model_dir: model_dir.to_path_buf(),
            source_url: None,
            load_mode: LoadMode::Owned,
        },
        [(Language::Fr, french_tagger())],
    )
}

pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}
