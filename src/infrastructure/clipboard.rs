use arboard::Clipboard;

/// Places `text` on the system clipboard, returning what was copied.
pub fn copy_to_clipboard(text: &str) -> Result<String, String> {
    let mut clipboard = Clipboard::new().map_err(|e| format!("Clipboard unavailable: {}", e))?;
    match clipboard.set_text(text.to_string()) {
        Ok(_) => Ok(text.to_string()),
        Err(e) => Err(e.to_string()),
    }
}
