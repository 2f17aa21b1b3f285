// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixture PDFs for unit tests.

use lopdf::{Document, Object, Stream, dictionary};

/// A PDF with `pages` pages, each carrying its own `/MediaBox`.
pub fn label_pdf(width: f64, height: f64, pages: usize) -> Vec<u8> {
    build(width, height, pages, false)
}

/// A one-page PDF whose `/MediaBox` lives on the page tree root only.
pub fn label_pdf_with_inherited_box(width: f64, height: f64) -> Vec<u8> {
    build(width, height, 1, true)
}

fn build(width: f64, height: f64, pages: usize, inherit_box: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let media_box = Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width as f32),
        Object::Real(height as f32),
    ]);

    let mut kids = Vec::with_capacity(pages);
    for index in 0..pages {
        let content = format!("BT /F1 12 Tf 72 72 Td (label {index}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if !inherit_box {
            page.set("MediaBox", media_box.clone());
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
    };
    if inherit_box {
        pages_dict.set("MediaBox", media_box);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialise fixture");
    bytes
}
