use lopdf::Document as LopdfDocument;

/// Width and height of the `Im0` image on every page, in page order.
pub fn page_image_sizes(doc: &LopdfDocument) -> Vec<(i64, i64)> {
    doc.get_pages()
        .values()
        .filter_map(|page_id| {
            let page = doc.get_dictionary(*page_id).ok()?;
            let resources = page.get(b"Resources").ok()?.as_dict().ok()?;
            let xobjects = resources.get(b"XObject").ok()?.as_dict().ok()?;
            let image_id = xobjects.get(b"Im0").ok()?.as_reference().ok()?;
            let image = doc.get_object(image_id).ok()?.as_stream().ok()?;
            let width = image.dict.get(b"Width").ok()?.as_i64().ok()?;
            let height = image.dict.get(b"Height").ok()?.as_i64().ok()?;
            Some((width, height))
        })
        .collect()
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert that every page of a PDF carries one JPEG image of the given size
#[macro_export]
macro_rules! assert_pdf_pages_are_images {
    ($pdf:expr, $width:expr, $height:expr) => {
        let sizes = $crate::common::pdf_assertions::page_image_sizes(&$pdf.doc);
        assert_eq!(sizes.len(), $pdf.page_count(), "every page should embed an image");
        for size in sizes {
            assert_eq!(size, ($width, $height));
        }
    };
}
