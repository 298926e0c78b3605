use crate::{
    commit::{self, CommitReport},
    config::{QUIT_PROMPT, VISIBLE_ROWS},
    modules::ModuleList,
    scan::ScanReport,
    viewport::Viewport,
};
use std::path::PathBuf;

/// Selection state: browsing moves the cursor alone; dragging couples
/// every single-step cursor move to a swap so the picked-up module
/// follows the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Dragging,
}

/// Abstract user intents, decoupled from the key map so the whole
/// engine runs without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CursorUp,
    CursorDown,
    Select,
    CommitPosition,
    ToggleActive,
    PageUp,
    PageDown,
    JumpHome,
    JumpEnd,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct Dialog {
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

pub struct App {
    pub modules: ModuleList,
    pub module_dir: PathBuf,
    pub position: usize,
    pub mode: Mode,
    pub viewport: Viewport,
    pub dialog: Option<Dialog>,
    pub status: String,
    pub logs: Vec<LogEntry>,
    pub should_quit: bool,
    pub report: Option<CommitReport>,
}

impl App {
    pub fn new(module_dir: PathBuf, scan: ScanReport) -> Self {
        let mut app = Self {
            modules: scan.modules,
            module_dir,
            position: 0,
            mode: Mode::Browsing,
            viewport: Viewport::new(VISIBLE_ROWS),
            dialog: None,
            status: String::new(),
            logs: Vec::new(),
            should_quit: false,
            report: None,
        };
        app.log_info(format!(
            "{} module(s) loaded from {}",
            app.modules.len(),
            app.module_dir.display()
        ));
        for warning in scan.warnings {
            app.log_warn(warning);
        }
        app
    }

    /// Frame-time upkeep: clamp the cursor and recompute the window.
    pub fn tick(&mut self) {
        self.clamp_position();
        self.viewport.sync(self.modules.len(), self.position);
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::CursorUp => self.cursor_up(),
            Intent::CursorDown => self.cursor_down(),
            Intent::Select => self.select(),
            Intent::CommitPosition => self.commit_position(),
            Intent::ToggleActive => self.toggle_active(),
            Intent::PageUp => self.page_up(),
            Intent::PageDown => self.page_down(),
            Intent::JumpHome => self.jump_home(),
            Intent::JumpEnd => self.jump_end(),
            Intent::Quit => self.request_quit(),
        }
    }

    fn cursor_up(&mut self) {
        if self.position == 0 {
            return;
        }
        match self.mode {
            Mode::Dragging => {
                // only follow a swap that actually happened
                if self.modules.swap_up(self.position) {
                    self.position -= 1;
                }
            }
            Mode::Browsing => self.position -= 1,
        }
    }

    fn cursor_down(&mut self) {
        let last = self.modules.len().saturating_sub(1);
        if self.modules.is_empty() || self.position >= last {
            return;
        }
        match self.mode {
            Mode::Dragging => {
                if self.modules.swap_down(self.position) {
                    self.position += 1;
                }
            }
            Mode::Browsing => self.position += 1,
        }
    }

    fn select(&mut self) {
        if self.modules.is_empty() {
            return;
        }
        self.mode = Mode::Dragging;
        self.status = "Reordering: arrows carry the module".to_string();
    }

    fn commit_position(&mut self) {
        self.mode = Mode::Browsing;
        self.status.clear();
    }

    fn toggle_active(&mut self) {
        if self.mode == Mode::Dragging || self.modules.is_empty() {
            return;
        }
        self.modules.toggle_active(self.position);
    }

    fn page_up(&mut self) {
        self.position = self.viewport.page_up(self.position);
    }

    fn page_down(&mut self) {
        self.position = self.viewport.page_down(self.modules.len(), self.position);
    }

    /// Home: while dragging, bubble the held module all the way to the
    /// top first. Drag mode persists across the jump.
    fn jump_home(&mut self) {
        if self.mode == Mode::Dragging {
            while self.modules.swap_up(self.position) {
                self.position -= 1;
            }
        }
        self.position = 0;
        self.viewport.jump_top();
    }

    fn jump_end(&mut self) {
        if self.mode == Mode::Dragging {
            while self.modules.swap_down(self.position) {
                self.position += 1;
            }
        }
        self.position = self.modules.len().saturating_sub(1);
        self.viewport.jump_bottom();
    }

    /// Quit is rejected mid-drag so a half-carried module can never be
    /// committed by accident.
    fn request_quit(&mut self) {
        if self.mode == Mode::Dragging {
            return;
        }
        self.dialog = Some(Dialog {
            prompt: QUIT_PROMPT.to_string(),
        });
    }

    pub fn dialog_resolve(&mut self, choice: DialogChoice) {
        if self.dialog.take().is_none() {
            return;
        }
        match choice {
            DialogChoice::Cancel => {}
            DialogChoice::No => self.should_quit = true,
            DialogChoice::Yes => {
                self.commit();
                self.should_quit = true;
            }
        }
    }

    fn commit(&mut self) {
        let ops = commit::plan(&self.modules);
        let report = commit::apply(&self.module_dir, ops);
        self.log_info(format!("{} module(s) committed", report.applied.len()));
        for failure in &report.failures {
            self.log_error(failure.to_string());
        }
        self.report = Some(report);
    }

    fn clamp_position(&mut self) {
        let len = self.modules.len();
        if len == 0 {
            self.position = 0;
        } else if self.position >= len {
            self.position = len - 1;
        }
    }

    pub fn log_info(&mut self, message: String) {
        self.push_log(LogLevel::Info, message);
    }

    pub fn log_warn(&mut self, message: String) {
        self.push_log(LogLevel::Warn, message);
    }

    pub fn log_error(&mut self, message: String) {
        self.push_log(LogLevel::Error, message);
    }

    fn push_log(&mut self, level: LogLevel, message: String) {
        self.logs.push(LogEntry { level, message });
    }
}
