//! Construction of `genpdf` documents with per-page header and footer.

use std::path::PathBuf;

use genpdf::error::{Error, ErrorKind};
use genpdf::style;
use genpdf::{self, Element, Margins, Mm, PageDecorator, Position, Size};

use crate::fonts;

/// Callback producing the decoration for a given 1-based page number.
pub type ElementFactory = dyn Fn(usize) -> Result<Box<dyn Element>, Error>;

/// Builder for `genpdf::Document` instances decorated with a repeating header
/// and a fixed-height footer.
#[derive(Default)]
pub struct DocumentBuilder {
    title: Option<String>,
    paper_size: Option<Size>,
    margins: Option<Margins>,
    font_dir: Option<PathBuf>,
    font_size: Option<u8>,
    header: Option<Box<ElementFactory>>,
    footer: Option<FooterSpec>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Searches this directory first when loading fonts.
    pub fn with_font_dir(mut self, font_dir: impl Into<Option<PathBuf>>) -> Self {
        self.font_dir = font_dir.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Configures a header callback that is invoked for every page.
    pub fn with_header<F>(mut self, header: F) -> Self
    where
        F: Fn(usize) -> Result<Box<dyn Element>, Error> + 'static,
    {
        self.header = Some(Box::new(header));
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> Result<Box<dyn Element>, Error> + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::load_font_family(self.font_dir.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        if let Some(title) = self.title {
            document.set_title(title);
        }

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }

        if let Some(font_size) = self.font_size {
            document.set_font_size(font_size);
        }

        let decorator = ConfiguredPageDecorator::new(self.margins, self.header, self.footer);
        document.set_page_decorator(decorator);

        Ok(document)
    }
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<ElementFactory>,
}

impl FooterSpec {
    pub fn new<F>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> Result<Box<dyn Element>, Error> + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(factory),
        }
    }
}

struct ConfiguredPageDecorator {
    page: usize,
    margins: Option<Margins>,
    header: Option<Box<ElementFactory>>,
    footer: Option<FooterSpec>,
}

impl ConfiguredPageDecorator {
    fn new(
        margins: Option<Margins>,
        header: Option<Box<ElementFactory>>,
        footer: Option<FooterSpec>,
    ) -> Self {
        Self {
            page: 0,
            margins,
            header,
            footer,
        }
    }
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(header_cb) = &self.header {
            let mut element = header_cb(self.page)?;
            let result = element.render(context, area.clone(), style)?;
            if result.has_more {
                return Err(Error::new(
                    "Header element does not fit on the page",
                    ErrorKind::PageSizeExceeded,
                ));
            }
            area.add_offset(Position::new(0, result.size.height));
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(self.page)?;
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}
