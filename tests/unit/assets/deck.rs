use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

/// Deck with `pages` solid-color pages; counts how often it is opened.
struct FakeRenderer {
    pages: usize,
    opens: Arc<AtomicUsize>,
}

struct FakeDoc {
    pages: usize,
}

impl DeckDocument for FakeDoc {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn render_page(&self, index: usize, scale: f32) -> DeckResult<image::RgbaImage> {
        let side = (10.0 * scale) as u32;
        let v = (index * 40) as u8;
        Ok(image::RgbaImage::from_pixel(
            side,
            side,
            image::Rgba([v, v, v, 255]),
        ))
    }
}

impl DeckRenderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension().is_some_and(|e| e == "fake")
    }

    fn open(&self, _path: &Path) -> DeckResult<Box<dyn DeckDocument>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDoc { pages: self.pages }))
    }
}

fn fake_rasterizer(pages: usize) -> (DeckRasterizer, Arc<AtomicUsize>) {
    let opens = Arc::new(AtomicUsize::new(0));
    let mut r = DeckRasterizer::without_renderers(2.0);
    r.push_renderer(Arc::new(FakeRenderer {
        pages,
        opens: opens.clone(),
    }));
    (r, opens)
}

#[test]
fn content_pages_skip_cover_only_when_there_is_more_than_one() {
    assert_eq!(content_pages(0), 0..0);
    assert_eq!(content_pages(1), 0..1);
    assert_eq!(content_pages(3), 1..3);
}

#[test]
fn three_page_deck_yields_two_pages_and_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("3.fake");
    std::fs::write(&deck, b"").unwrap();
    let mut scratch = ScratchDir::new().unwrap();
    let (mut r, opens) = fake_rasterizer(3);

    let pages = r.pages(3, &deck, &mut scratch).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].width, 20);
    assert!(pages.iter().all(|p| p.path.starts_with(scratch.path()) && p.path.exists()));
    // Page 1 of the document is the first content page.
    assert_eq!(pages[0].image.to_rgba8().get_pixel(0, 0).0[0], 40);

    let again = r.pages(3, &deck, &mut scratch).unwrap();
    assert!(Arc::ptr_eq(&pages, &again));
    assert_eq!(opens.load(Ordering::SeqCst), 1);

    let p2 = r.page_for_slide(3, &deck, 2, &mut scratch).unwrap();
    assert_eq!(p2.path, pages[0].path);
    let p3 = r.page_for_slide(3, &deck, 3, &mut scratch).unwrap();
    assert_eq!(p3.path, pages[1].path);
}

#[test]
fn single_page_deck_keeps_its_only_page() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("1.fake");
    std::fs::write(&deck, b"").unwrap();
    let mut scratch = ScratchDir::new().unwrap();
    let (mut r, _) = fake_rasterizer(1);
    assert_eq!(r.pages(1, &deck, &mut scratch).unwrap().len(), 1);
}

#[test]
fn empty_deck_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("2.fake");
    std::fs::write(&deck, b"").unwrap();
    let mut scratch = ScratchDir::new().unwrap();
    let (mut r, _) = fake_rasterizer(0);
    assert!(matches!(
        r.pages(2, &deck, &mut scratch).unwrap_err(),
        DeckError::EmptyTemplate { .. }
    ));
}

#[test]
fn unsupported_format_reports_missing_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("4.pdf");
    std::fs::write(&deck, b"%PDF-1.4").unwrap();
    let mut scratch = ScratchDir::new().unwrap();
    let (mut r, _) = fake_rasterizer(2);
    let err = r.pages(4, &deck, &mut scratch).unwrap_err();
    assert!(matches!(err, DeckError::MissingRenderer { template_id: 4, .. }));
}

#[cfg(feature = "svg-deck")]
#[test]
fn svgdeck_file_renders_content_pages() {
    let page = |fill: &str| {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="{fill}"/></svg>"#
        )
    };
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("5_demo.svgdeck");
    std::fs::write(
        &deck,
        format!("{}\n{}\n{}\n", page("black"), page("#00ff00"), page("blue")),
    )
    .unwrap();

    let mut scratch = ScratchDir::new().unwrap();
    let mut r = DeckRasterizer::without_renderers(1.0);
    r.push_renderer(Arc::new(SvgDeckRenderer::with_fontdb(Arc::new(
        usvg::fontdb::Database::new(),
    ))));
    let pages = r.pages(5, &deck, &mut scratch).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!((pages[0].width, pages[0].height), (20, 10));
    assert_eq!(pages[0].image.to_rgba8().get_pixel(5, 5).0, [0, 255, 0, 255]);
    assert_eq!(pages[1].image.to_rgba8().get_pixel(5, 5).0, [0, 0, 255, 255]);
}

/// Minimal PDF with one 40x30pt page per entry of `fills`, each page a solid RGB rectangle.
#[cfg(feature = "pdf-deck")]
fn solid_pages_pdf(fills: &[[u8; 3]]) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..fills.len())
                .map(|i| format!("{} 0 R", 3 + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            fills.len()
        ),
    ];
    for (i, [r, g, b]) in fills.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 40 30] /Resources << >> /Contents {} 0 R >>",
            4 + 2 * i
        ));
        let content = format!("{r} {g} {b} rg 0 0 40 30 re f");
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref = out.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        tail.push_str(&format!("{off:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));
    out.extend_from_slice(tail.as_bytes());
    out
}

#[cfg(feature = "pdf-deck")]
#[test]
fn three_page_pdf_deck_yields_two_pages_and_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("6_slides.pdf");
    std::fs::write(&deck, solid_pages_pdf(&[[1, 0, 0], [0, 1, 0], [0, 0, 1]])).unwrap();

    let mut scratch = ScratchDir::new().unwrap();
    let mut r = DeckRasterizer::without_renderers(2.0);
    r.push_renderer(Arc::new(PdfDeckRenderer));
    let pages = r.pages(6, &deck, &mut scratch).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].width.abs_diff(80) <= 1 && pages[0].height.abs_diff(60) <= 1);
    assert!(pages.iter().all(|p| p.path.exists()));

    let green = pages[0].image.to_rgba8().get_pixel(40, 30).0;
    assert!(green[1] > 200 && green[0] < 60 && green[2] < 60, "{green:?}");
    let blue = pages[1].image.to_rgba8().get_pixel(40, 30).0;
    assert!(blue[2] > 200 && blue[0] < 60 && blue[1] < 60, "{blue:?}");

    let again = r.pages(6, &deck, &mut scratch).unwrap();
    assert!(Arc::ptr_eq(&pages, &again));
}

#[cfg(feature = "pdf-deck")]
#[test]
fn builtin_renderers_open_pdf_decks() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("2.pdf");
    std::fs::write(&deck, solid_pages_pdf(&[[1, 1, 1], [0, 0, 0]])).unwrap();

    let mut scratch = ScratchDir::new().unwrap();
    let mut r = DeckRasterizer::with_builtin_renderers(1.0);
    let page = r.page_for_slide(2, &deck, 5, &mut scratch).unwrap();
    assert_eq!(page.image.to_rgba8().get_pixel(10, 10).0[0], 0);
}

#[cfg(feature = "pdf-deck")]
#[test]
fn corrupt_pdf_deck_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("3.pdf");
    std::fs::write(&deck, b"not a pdf at all").unwrap();
    let mut scratch = ScratchDir::new().unwrap();
    let mut r = DeckRasterizer::with_builtin_renderers(1.0);
    assert!(r.pages(3, &deck, &mut scratch).is_err());
}
