//! Save location prompt on the terminal

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::download::{DestinationPrompt, SaveDialog};

/// Asks on stdin where to save, offering `<default_dir>/<file name>`.
///
/// Empty input accepts the default, `q` or end of input cancels.
pub struct TerminalPrompt {
    default_dir: PathBuf,
    assume_default: bool,
}

impl TerminalPrompt {
    pub fn new(default_dir: PathBuf, assume_default: bool) -> Self {
        Self {
            default_dir,
            assume_default,
        }
    }

    fn interpret(&self, dialog: &SaveDialog, answer: Option<&str>) -> Option<PathBuf> {
        let default = self.default_dir.join(&dialog.initial_file_name);
        let answer = answer?.trim();

        match answer {
            "" => Some(default),
            "q" | "Q" => None,
            path => {
                let path = PathBuf::from(path);
                if path.is_dir() {
                    Some(path.join(&dialog.initial_file_name))
                } else {
                    Some(path)
                }
            }
        }
    }
}

impl DestinationPrompt for TerminalPrompt {
    fn choose_destination(&self, dialog: &SaveDialog) -> Option<PathBuf> {
        if self.assume_default {
            return self.interpret(dialog, Some(""));
        }

        let default = self.default_dir.join(&dialog.initial_file_name);
        print!(
            "{} ({}) [{}], q to cancel: ",
            dialog.title,
            dialog.filter_pattern,
            default.display()
        );
        std::io::stdout().flush().ok();

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line);
        match read {
            Ok(0) | Err(_) => None,
            Ok(_) => self.interpret(dialog, Some(&line)),
        }
    }
}
