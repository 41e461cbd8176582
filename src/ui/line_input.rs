use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Caps for filesystem completion so huge directories stay responsive.
const MAX_SCANNED_ENTRIES: usize = 1000;
const MAX_COMPLETIONS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line text editor used by every prompt.
#[derive(Clone, Debug)]
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    complete_paths: bool,
    completions: Vec<String>,
    completion_index: Option<usize>,
    /// True if the last completion attempt could not read the directory.
    pub completion_error: bool,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            complete_paths: false,
            completions: Vec::new(),
            completion_index: None,
            completion_error: false,
        }
    }

    /// An editor whose Tab key completes filesystem paths.
    pub fn for_path(text: &str) -> Self {
        Self {
            complete_paths: true,
            ..Self::new(text)
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let at = self.byte_at(self.cursor);
        match self.text[at..].chars().next() {
            Some(ch) => (&self.text[..at], Some(ch), &self.text[at + ch.len_utf8()..]),
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.reset_completion();
        }

        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.len() => self.remove_at(self.cursor),
            KeyCode::Tab if self.complete_paths => self.cycle_completion(true),
            KeyCode::BackTab if self.complete_paths => self.cycle_completion(false),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let at = self.byte_at(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_at(&mut self, char_idx: usize) {
        let at = self.byte_at(char_idx);
        if let Some(ch) = self.text[at..].chars().next() {
            self.text.replace_range(at..at + ch.len_utf8(), "");
        }
    }

    /// unix-word-rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let (start, end) = (self.byte_at(pos), self.byte_at(self.cursor));
        self.text.replace_range(start..end, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_error = false;
    }

    fn cycle_completion(&mut self, forward: bool) {
        if self.cursor < self.len() {
            return;
        }
        let next = match self.completion_index {
            None => {
                self.completions = self.read_completions();
                if self.completions.is_empty() {
                    return;
                }
                0
            }
            Some(idx) => {
                let count = self.completions.len();
                if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                }
            }
        };
        self.completion_index = Some(next);
        self.text = self.completions[next].clone();
        self.cursor = self.len();
    }

    fn read_completions(&mut self) -> Vec<String> {
        let seed = self.text.clone();
        let split = seed.rfind(['/', '\\']).map(|p| p + 1).unwrap_or(0);
        let (dir_str, partial) = seed.split_at(split);

        let dir = if dir_str.is_empty() {
            std::path::PathBuf::from(".")
        } else {
            crate::config::expand_home(dir_str)
        };

        let entries = match std::fs::read_dir(&dir) {
            Ok(rd) => rd.map(|r| {
                r.map(|e| {
                    let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                    (e.file_name().to_string_lossy().to_string(), is_dir)
                })
            }),
            Err(_) => {
                self.completion_error = true;
                return Vec::new();
            }
        };
        self.collect_completions(entries, dir_str, partial)
    }

    /// Filter and sort candidate entries. Directories come first and carry a
    /// trailing separator; hidden entries only match a leading `.`.
    fn collect_completions(
        &mut self,
        entries: impl Iterator<Item = std::io::Result<(String, bool)>>,
        dir_str: &str,
        partial: &str,
    ) -> Vec<String> {
        let sep = std::path::MAIN_SEPARATOR;
        let include_hidden = partial.starts_with('.');

        let mut candidates: Vec<(bool, String)> = Vec::new();
        for entry in entries.take(MAX_SCANNED_ENTRIES) {
            let Ok((name, is_dir)) = entry else {
                self.completion_error = true;
                return Vec::new();
            };
            if (!include_hidden && name.starts_with('.')) || !name.starts_with(partial) {
                continue;
            }
            let full = if is_dir {
                format!("{dir_str}{name}{sep}")
            } else {
                format!("{dir_str}{name}")
            };
            candidates.push((is_dir, full));
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        candidates.truncate(MAX_COMPLETIONS);
        candidates.into_iter().map(|(_, path)| path).collect()
    }
}
