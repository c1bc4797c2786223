//! Markup templates for the EPUB container.
//!
//! The documents are small and fully determined by the page list, so they are
//! rendered with plain string formatting. Only the title is free text; it is
//! escaped before it reaches any markup.

use super::{ManifestItem, PackageMetadata};

/// Path of the container descriptor inside the archive.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
/// Path of the package document (manifest + spine).
pub const CONTENT_PATH: &str = "OEBPS/content.opf";
/// Path of the navigation map.
pub const TOC_PATH: &str = "OEBPS/toc.ncx";
/// Directory of the OPF; every href in it is relative to this.
pub const CONTENT_DIR: &str = "OEBPS";

/// Escape the five XML special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// `META-INF/container.xml`: points readers at the package document.
pub fn container_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{CONTENT_PATH}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#
    )
}

/// One page: a single full-bleed image.
pub fn page_xhtml(item: &ManifestItem) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>{base}</title>
  <style type="text/css">body {{ margin: 0; padding: 0; }} img {{ display: block; width: 100%; height: 100%; }}</style>
</head>
<body>
  <div><img src="../{href}" alt="{base}"/></div>
</body>
</html>
"#,
        base = item.base,
        href = item.image_href(),
    )
}

/// `OEBPS/content.opf`: metadata, manifest of every page and image, spine.
pub fn content_opf(meta: &PackageMetadata, items: &[ManifestItem]) -> String {
    let mut opf = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape_xml(&meta.title)
    ));
    opf.push_str("    <dc:language>en</dc:language>\n");
    opf.push_str(&format!("    <dc:date>{}</dc:date>\n", meta.date));
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookId\" opf:scheme=\"UUID\">urn:uuid:{}</dc:identifier>\n",
        meta.identifier
    ));
    if let Some(first) = items.first() {
        opf.push_str(&format!(
            "    <meta name=\"cover\" content=\"image{:03}\"/>\n",
            first.id
        ));
    }
    opf.push_str("    <meta name=\"fixed-layout\" content=\"true\"/>\n");
    opf.push_str("    <meta name=\"book-type\" content=\"comic\"/>\n");
    opf.push_str("  </metadata>\n  <manifest>\n");
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    for item in items {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            item.base,
            item.page_href()
        ));
        opf.push_str(&format!(
            "    <item id=\"image{:03}\" href=\"{}\" media-type=\"{}\"/>\n",
            item.id,
            item.image_href(),
            item.media_type
        ));
    }
    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    for item in items {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", item.base));
    }
    opf.push_str("  </spine>\n</package>\n");
    opf
}

/// `OEBPS/toc.ncx`: one navigation point per page, in spine order.
pub fn toc_ncx(meta: &PackageMetadata, items: &[ManifestItem]) -> String {
    let mut ncx = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
"#,
    );
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"urn:uuid:{}\"/>\n",
        meta.identifier
    ));
    ncx.push_str("    <meta name=\"dtb:depth\" content=\"1\"/>\n");
    ncx.push_str("    <meta name=\"dtb:totalPageCount\" content=\"0\"/>\n");
    ncx.push_str("    <meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n");
    ncx.push_str("  </head>\n");
    ncx.push_str(&format!(
        "  <docTitle><text>{}</text></docTitle>\n",
        escape_xml(&meta.title)
    ));
    ncx.push_str("  <navMap>\n");
    for item in items {
        ncx.push_str(&format!(
            "    <navPoint id=\"navpoint-{id}\" playOrder=\"{id}\">\
<navLabel><text>Page {id}</text></navLabel>\
<content src=\"{href}\"/></navPoint>\n",
            id = item.id,
            href = item.page_href()
        ));
    }
    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}
