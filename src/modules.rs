use crate::config::LEFT_PAD;

/// One orderable unit backed by a file in the module directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub title: String,
    pub active: bool,
    pub rank: Option<String>,
    pub identity: String,
}

impl Module {
    pub fn from_file_name(file_name: &str, title: String, active: bool) -> Self {
        let (rank, identity) = split_rank(file_name);
        Self {
            title,
            active,
            rank,
            identity,
        }
    }

    /// Current on-disk file name for this module.
    pub fn file_name(&self) -> String {
        match &self.rank {
            Some(rank) => format!("{rank}_{}", self.identity),
            None => self.identity.clone(),
        }
    }

    /// Active marker plus title, truncated to fit the module box.
    pub fn display_label(&self, width: usize) -> String {
        let marker = if self.active { "* " } else { "  " };
        let label = format!("{marker}{}", self.title);
        let budget = width.saturating_sub(LEFT_PAD).saturating_sub(1);
        if label.chars().count() > budget {
            let keep: String = label.chars().take(budget.saturating_sub(3)).collect();
            format!("{keep}...")
        } else {
            label
        }
    }

    pub fn toggle_active(&mut self) {
        self.active = !self.active;
    }
}

/// Split an on-disk file name into rank token and stable identity.
/// Only an all-digit prefix before the first underscore counts as a
/// rank; single digits are padded to the two-character form.
pub fn split_rank(file_name: &str) -> (Option<String>, String) {
    if let Some((prefix, rest)) = file_name.split_once('_') {
        if !prefix.is_empty() && !rest.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            return (Some(format!("{prefix:0>2}")), rest.to_string());
        }
    }
    (None, file_name.to_string())
}

/// The ordered module sequence. Array position is the priority order;
/// after the initial scan the list only ever swaps neighbours and
/// flips flags, so no other mutation is exposed.
#[derive(Debug, Clone, Default)]
pub struct ModuleList {
    entries: Vec<Module>,
}

impl ModuleList {
    pub fn new(entries: Vec<Module>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Module> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.entries.iter()
    }

    /// Exchange the entry at `index` with the one above it. Returns
    /// false when already at the top.
    pub fn swap_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.entries.swap(index - 1, index);
        true
    }

    /// Exchange the entry at `index` with the one below it. Returns
    /// false when already at the bottom.
    pub fn swap_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index + 1);
        true
    }

    pub fn toggle_active(&mut self, index: usize) {
        if let Some(module) = self.entries.get_mut(index) {
            module.toggle_active();
        }
    }
}
