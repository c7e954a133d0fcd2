#![allow(non_snake_case)]

use super::xname::XName;

pub mod W {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    pub fn document() -> XName { XName::new(NS, "document") }
    pub fn body() -> XName { XName::new(NS, "body") }
    pub fn p() -> XName { XName::new(NS, "p") }
    pub fn pPr() -> XName { XName::new(NS, "pPr") }
    pub fn r() -> XName { XName::new(NS, "r") }
    pub fn rPr() -> XName { XName::new(NS, "rPr") }
    pub fn t() -> XName { XName::new(NS, "t") }
    pub fn hyperlink() -> XName { XName::new(NS, "hyperlink") }
    pub fn b() -> XName { XName::new(NS, "b") }
    pub fn color() -> XName { XName::new(NS, "color") }
    pub fn u() -> XName { XName::new(NS, "u") }
    pub fn val() -> XName { XName::new(NS, "val") }
    pub fn history() -> XName { XName::new(NS, "history") }
}

/// officeDocument relationships namespace, used for `r:id` references from content parts.
pub mod R {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const PREFIX: &str = "r";

    pub fn id() -> XName { XName::new(NS, "id") }
}

/// Package relationships namespace, used inside `*.rels` parts.
pub mod PR {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub fn Relationships() -> XName { XName::new(NS, "Relationships") }
    pub fn Relationship() -> XName { XName::new(NS, "Relationship") }
    pub fn Id() -> XName { XName::local("Id") }
    pub fn Type() -> XName { XName::local("Type") }
    pub fn Target() -> XName { XName::local("Target") }
    pub fn TargetMode() -> XName { XName::local("TargetMode") }
}

pub mod XML {
    use super::XName;
    pub use crate::xml::xname::XML_NS as NS;

    pub fn space() -> XName { XName::new(NS, "space") }
}

/// Conventional prefix for a namespace that has no in-scope declaration.
pub fn conventional_prefix(namespace: &str) -> &'static str {
    match namespace {
        W::NS => "w",
        R::NS => R::PREFIX,
        "http://schemas.microsoft.com/office/word/2010/wordml" => "w14",
        "http://schemas.microsoft.com/office/word/2012/wordml" => "w15",
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" => "wp",
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        "http://schemas.openxmlformats.org/officeDocument/2006/math" => "m",
        "urn:schemas-microsoft-com:vml" => "v",
        "urn:schemas-microsoft-com:office:office" => "o",
        crate::xml::xname::XMLNS_NS => "xmlns",
        XML::NS => "xml",
        _ => "ns",
    }
}
