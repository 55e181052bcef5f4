//! Prompt template for summarizing OCR'd prescriptions.

/// Build the single user message sent to the chat model.
///
/// The model must answer with an HTML fragment restricted to `<p>`, `<h3>`,
/// `<ul>` and `<li>` so the client can render it directly.
pub fn prescription_summary_prompt(ocr_text: &str) -> String {
    format!(
        "The following text was extracted by OCR from a photographed medical prescription:\n\
         {ocr_text}\n\
         For every medicine it lists, give the dosage, the precautions to take and any \
         practical pointers. Add a Medicine General Information section describing the \
         condition this combination of medicines most likely treats, then close with two \
         or three general health suggestions or facts about that condition. \
         Reply with an HTML fragment using only the <p>, <h3>, <ul> and <li> tags, \
         without quotation marks or literal newline escapes."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_ocr_text() {
        let prompt = prescription_summary_prompt("Tab. Paracetamol 500mg BD");
        assert!(prompt.contains("Tab. Paracetamol 500mg BD"));
    }

    #[test]
    fn prompt_restricts_html_tags() {
        let prompt = prescription_summary_prompt("x");
        for tag in ["<p>", "<h3>", "<ul>", "<li>"] {
            assert!(prompt.contains(tag), "missing {tag}");
        }
    }
}
