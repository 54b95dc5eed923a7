//! Create/edit dialog state.
//!
//! The draft lives here until the dialog is submitted through `Manager::submit`;
//! cancelling drops it without touching the list.

use serde::Serialize;

use crate::store::{Draft, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Dialog<D> {
    Closed,
    Create {
        draft: D,
        error: Option<String>,
    },
    View {
        id: String,
        draft: D,
    },
    Edit {
        id: String,
        draft: D,
        error: Option<String>,
    },
}

impl<D: Draft> Dialog<D> {
    pub fn is_closed(&self) -> bool {
        matches!(self, Dialog::Closed)
    }

    pub fn open_create(&mut self) -> Result<(), StoreError> {
        self.require_closed("open a create form")?;
        *self = Dialog::Create {
            draft: D::default(),
            error: None,
        };
        Ok(())
    }

    pub fn open_view(&mut self, id: &str, draft: D) -> Result<(), StoreError> {
        self.require_closed("open a record")?;
        *self = Dialog::View {
            id: id.to_string(),
            draft,
        };
        Ok(())
    }

    pub fn begin_edit(&mut self) -> Result<(), StoreError> {
        let Dialog::View { id, draft } = self else {
            return Err(StoreError::rejected("open a record before editing it"));
        };
        *self = Dialog::Edit {
            id: std::mem::take(id),
            draft: std::mem::take(draft),
            error: None,
        };
        Ok(())
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Dialog::Create { draft, .. } | Dialog::Edit { draft, .. } => Some(draft),
            Dialog::Closed | Dialog::View { .. } => None,
        }
    }

    /// Merge a JSON object of field values into the open draft.
    pub fn set_fields(&mut self, fields: &serde_json::Value) -> Result<(), StoreError> {
        let Some(draft) = self.draft_mut() else {
            return Err(StoreError::rejected("no editable form is open"));
        };
        let merged = merge_fields(draft, fields).map_err(|e| StoreError::rejected(e.to_string()))?;
        *draft = merged;
        Ok(())
    }

    pub fn show_error(&mut self, message: String) {
        if let Dialog::Create { error, .. } | Dialog::Edit { error, .. } = self {
            *error = Some(message);
        }
    }

    pub fn cancel(&mut self) {
        *self = Dialog::Closed;
    }

    fn require_closed(&self, action: &str) -> Result<(), StoreError> {
        if self.is_closed() {
            Ok(())
        } else {
            Err(StoreError::rejected(format!(
                "close the open form before trying to {action}"
            )))
        }
    }
}

pub fn merge_fields<D: Draft>(draft: &D, fields: &serde_json::Value) -> serde_json::Result<D> {
    let mut current = serde_json::to_value(draft)?;
    if let (Some(dst), Some(src)) = (current.as_object_mut(), fields.as_object()) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(current)
}
