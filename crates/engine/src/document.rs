use crate::sheet::{is_valid_sheet_name, normalize_sheet_name, Sheet, SheetId};

/// Name given to the sheet a fresh document starts with.
pub const DEFAULT_SHEET_NAME: &str = "Sheet";

/// An ordered collection of named sheets.
#[derive(Debug, Clone)]
pub struct TabularDocument {
    sheets: Vec<Sheet>,
    /// Next ID to assign to a new sheet. Monotonically increasing, never reused.
    next_sheet_id: u64,
}

impl Default for TabularDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularDocument {
    /// Create a document with one default sheet, the way a fresh workbook opens.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let id = doc.generate_sheet_id();
        doc.sheets.push(Sheet::new_with_name(id, DEFAULT_SHEET_NAME));
        doc
    }

    /// Create a document without any sheet.
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            next_sheet_id: 1,
        }
    }

    /// Generate a new unique SheetId (monotonically increasing, never reused)
    pub fn generate_sheet_id(&mut self) -> SheetId {
        let id = SheetId::from_raw(self.next_sheet_id);
        self.next_sheet_id += 1;
        id
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Sheet names in document order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check if a sheet name already exists (case-insensitive)
    pub fn sheet_name_exists(&self, name: &str) -> bool {
        let key = normalize_sheet_name(name);
        self.sheets.iter().any(|s| s.name_key() == key)
    }

    /// Find a sheet by name (case-insensitive)
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        let key = normalize_sheet_name(name);
        self.sheets.iter().find(|s| s.name_key() == key)
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        let key = normalize_sheet_name(name);
        self.sheets.iter_mut().find(|s| s.name_key() == key)
    }

    pub fn sheet_by_id(&self, id: SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id == id)
    }

    /// Add a new empty sheet with a specific name.
    /// Returns None if the name is invalid or already taken.
    pub fn add_sheet_named(&mut self, name: &str) -> Option<&mut Sheet> {
        if !is_valid_sheet_name(name) || self.sheet_name_exists(name) {
            return None;
        }
        let id = self.generate_sheet_id();
        self.sheets.push(Sheet::new_with_name(id, name));
        self.sheets.last_mut()
    }

    /// Append a fully built sheet. Fails on an invalid or duplicate name, or
    /// a duplicate id.
    pub fn push_sheet(&mut self, sheet: Sheet) -> Result<(), String> {
        if !is_valid_sheet_name(&sheet.name) {
            return Err(format!("invalid sheet name '{}'", sheet.name));
        }
        if self.sheet_name_exists(&sheet.name) {
            return Err(format!("sheet '{}' already exists", sheet.name));
        }
        if self.sheet_by_id(sheet.id).is_some() {
            return Err(format!("sheet id {} already in use", sheet.id.raw()));
        }
        self.next_sheet_id = self.next_sheet_id.max(sheet.id.raw() + 1);
        self.sheets.push(sheet);
        Ok(())
    }

    /// Remove a sheet by id. Returns the removed sheet.
    pub fn remove_sheet(&mut self, id: SheetId) -> Option<Sheet> {
        let idx = self.sheets.iter().position(|s| s.id == id)?;
        Some(self.sheets.remove(idx))
    }
}
