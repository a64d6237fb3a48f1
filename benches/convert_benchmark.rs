//! Benchmarks for unocr conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic character-level hOCR and ABBYY pages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WORDS: [&str; 8] = ["The", "quick", "brown", "fox", "jumps", "over", "lazy", "dogs"];

/// Character boxes for one line of text, 12px per glyph.
fn glyph_boxes(line: usize) -> Vec<(String, i32, i32, i32, i32)> {
    let top = 100 + 40 * line as i32;
    let mut x = 100;
    let mut boxes = Vec::new();
    for word in WORDS {
        for c in word.chars() {
            let t = if c.is_ascii_uppercase() || "bdhkl".contains(c) { top } else { top + 8 };
            boxes.push((c.to_string(), x, t, x + 10, top + 24));
            x += 12;
        }
        boxes.push((" ".to_string(), x, top, x + 12, top + 24));
        x += 12;
    }
    boxes
}

/// Creates a character-level hOCR document with the given number of pages.
fn create_test_hocr(page_count: usize, lines: usize) -> String {
    let mut content = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html><head><meta name='ocr-system' content='tesseract'></head><body>\n",
    );
    for p in 0..page_count {
        content.push_str(&format!(
            "<div class='ocr_page' id='page_{}' title='bbox 0 0 2550 3300'>",
            p + 1
        ));
        for l in 0..lines {
            let top = 100 + 40 * l;
            content.push_str(&format!(
                "<span class='ocr_line' title='bbox 100 {} 1200 {}; baseline 0 -6; x_size 30; x_descenders 6; x_ascenders 8'>",
                top,
                top + 30
            ));
            content.push_str("<span class='ocrx_word' title='bbox 0 0 1 1; x_wconf 90'>");
            for (c, l, t, r, b) in glyph_boxes(l) {
                if c == " " {
                    content.push_str("</span><span class='ocrx_word' title='bbox 0 0 1 1; x_wconf 90'>");
                } else {
                    content.push_str(&format!(
                        "<span class='ocrx_cinfo' title='x_bboxes {} {} {} {}'>{}</span>",
                        l, t, r, b, c
                    ));
                }
            }
            content.push_str("</span></span>\n");
        }
        content.push_str("</div>\n");
    }
    content.push_str("</body></html>\n");
    content
}

/// Creates an ABBYY document with the given number of pages.
fn create_test_abbyy(page_count: usize, lines: usize) -> String {
    let mut content = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<document xmlns=\"http://www.abbyy.com/FineReader_xml/FineReader10-schema-v1.xml\">\n",
    );
    for _ in 0..page_count {
        content.push_str("<page width=\"2550\" height=\"3300\"><block blockType=\"Text\"><text><par>");
        for l in 0..lines {
            let top = 100 + 40 * l;
            content.push_str(&format!(
                "<line baseline=\"{}\" l=\"100\" t=\"{}\" r=\"1200\" b=\"{}\"><formatting ff=\"Times New Roman\" fs=\"10.\">",
                top + 24,
                top,
                top + 24
            ));
            for (c, l, t, r, b) in glyph_boxes(l) {
                content.push_str(&format!(
                    "<charParams l=\"{}\" t=\"{}\" r=\"{}\" b=\"{}\">{}</charParams>",
                    l, t, r, b, c
                ));
            }
            content.push_str("</formatting></line>");
        }
        content.push_str("</par></text></block></page>\n");
    }
    content.push_str("</document>\n");
    content
}

/// Benchmark format detection.
fn bench_format_detection(c: &mut Criterion) {
    let hocr = create_test_hocr(1, 10);
    let abbyy = create_test_abbyy(1, 10);

    c.bench_function("detect_hocr", |b| {
        b.iter(|| unocr::detect_format(black_box(&hocr)).unwrap());
    });

    c.bench_function("detect_abbyy", |b| {
        b.iter(|| unocr::detect_format(black_box(&abbyy)).unwrap());
    });
}

/// Benchmark single-page conversion.
fn bench_page_conversion(c: &mut Criterion) {
    let hocr = create_test_hocr(1, 40);
    let abbyy = create_test_abbyy(1, 40);

    c.bench_function("hocr_page", |b| {
        b.iter(|| unocr::convert_hocr(black_box(&hocr), 0, None, 0.0, None).unwrap());
    });

    c.bench_function("abbyy_page", |b| {
        b.iter(|| unocr::convert_abbyy(black_box(&abbyy), 0).unwrap());
    });
}

/// Benchmark document conversion at various sizes.
fn bench_document_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_conversion");

    for page_count in [1, 5, 10].iter() {
        let data = create_test_hocr(*page_count, 40);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            let options = unocr::ConvertOptions::new();
            b.iter(|| unocr::convert_str(black_box(&data), &options).unwrap());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let options = unocr::ConvertOptions::new().sequential();
            b.iter(|| unocr::convert_str(black_box(&data), &options).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_page_conversion,
    bench_document_conversion,
);
criterion_main!(benches);
