use serde::Serialize;

use crate::display::text_to_paragraph_html;

pub const WAITING_MESSAGE: &str = "Processing, please wait...";

/// Handle to one loading indicator on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spinner {
    pub id: &'static str,
    pub hidden: bool,
}

impl Spinner {
    pub fn new(id: &'static str) -> Self {
        Self { id, hidden: true }
    }
}

/// OCR and latinized text cards, plus the action buttons they unlock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextPanels {
    ocr_paragraphs: Vec<String>,
    latinized_paragraphs: Vec<String>,
    pub ocr_info: String,
    pub latinized_info: String,
    pub extract_visible: bool,
    pub save_visible: bool,
}

impl TextPanels {
    pub fn begin_processing(&mut self, spinners: &mut [Spinner]) {
        spinners.iter_mut().for_each(|s| s.hidden = false);
        self.ocr_info = WAITING_MESSAGE.to_string();
        self.latinized_info = WAITING_MESSAGE.to_string();
    }

    /// Shows a finished OCR/latinization result.
    /// With `append_mode` the texts are added after earlier results, otherwise they replace them.
    /// Both action buttons become visible whatever the text.
    pub fn render_extracted_text(
        &mut self,
        ocr: &str,
        latinized: &str,
        append_mode: bool,
        spinners: &mut [Spinner],
    ) {
        spinners.iter_mut().for_each(|s| s.hidden = true);
        self.ocr_info.clear();
        self.latinized_info.clear();

        if !append_mode {
            self.ocr_paragraphs.clear();
            self.latinized_paragraphs.clear();
        }
        self.ocr_paragraphs.push(ocr.to_string());
        self.latinized_paragraphs.push(latinized.to_string());

        self.extract_visible = true;
        self.save_visible = true;
    }

    /// Puts a failure message where the text would go and stops the spinners.
    /// Earlier text stays visible.
    pub fn render_failure(&mut self, message: &str, spinners: &mut [Spinner]) {
        spinners.iter_mut().for_each(|s| s.hidden = true);
        self.ocr_info = message.to_string();
        self.latinized_info = message.to_string();
    }

    /// Plain text of the latinized card, one line per paragraph
    pub fn latinized_text(&self) -> String {
        self.latinized_paragraphs.join("\n")
    }

    /// Inner HTML of `#ocr_text`
    pub fn ocr_html(&self) -> String {
        self.ocr_paragraphs
            .iter()
            .map(|p| format!("<p class=\"text-gray-700 text-lg\">{}</p>", text_to_paragraph_html(p)))
            .collect()
    }

    /// Inner HTML of `#latinized_text`
    pub fn latinized_html(&self) -> String {
        self.latinized_paragraphs
            .iter()
            .map(|p| {
                format!(
                    "<p class=\"text-gray-700 text-sm leading-relaxed\">{}</p>",
                    text_to_paragraph_html(p)
                )
            })
            .collect()
    }
}
