//! Review reconciler
//!
//! Holds the extracted draft next to an immutable snapshot taken at
//! construction. All user corrections go through a single edit session; the
//! diff against the snapshot is what gets reported back on confirm.
//!
//! Money and quantity math happens in `Decimal` to keep recomputed prices
//! honest; comparisons use the shared tolerances so re-serialized floats
//! don't show up as phantom edits.

use crate::error::ReconcileError;
use shared::contracts::ChangedItem;
use shared::models::{LineItem, ReceiptDraft};
use shared::money::{money_eq, quantity_eq, round_price, round_quantity, to_decimal, to_f64};

/// Per-item review outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemReviewState {
    /// Untouched since extraction
    Pending,
    /// Verified through an edit session
    Edited,
    /// Verified as-is, no field changed
    AcceptedAsIs,
}

impl ItemReviewState {
    pub fn is_verified(self) -> bool {
        !matches!(self, ItemReviewState::Pending)
    }
}

/// Reconciler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Reviewing,
    Editing(usize),
    Confirmed,
}

/// An open edit on one line item.
///
/// Works on a copy; nothing touches the draft until `commit_edit`. Price
/// setters recompute the dependent field directionally:
/// quantity or total edits derive `unit_price`, a unit price edit derives
/// `total_price`.
#[derive(Debug, Clone)]
pub struct EditSession {
    index: usize,
    item: LineItem,
}

impl EditSession {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn item(&self) -> &LineItem {
        &self.item
    }

    pub fn set_canonical_name(&mut self, name: impl Into<String>) {
        self.item.canonical_name = Some(name.into());
    }

    pub fn set_brand(&mut self, brand: Option<String>) {
        self.item.brand = brand;
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.item.category = category;
    }

    pub fn set_subcategory(&mut self, subcategory: Option<String>) {
        self.item.subcategory = subcategory;
    }

    pub fn set_size(&mut self, size: Option<String>) {
        self.item.size = size;
    }

    pub fn set_unit_type(&mut self, unit_type: Option<String>) {
        self.item.unit_type = unit_type;
    }

    /// Change the quantity; re-derives unit price from the existing total.
    /// A zero quantity is legal (weighed items scanned but not priced yet)
    /// and leaves the unit price alone.
    pub fn set_quantity(&mut self, quantity: f64) -> Result<(), ReconcileError> {
        if !(quantity >= 0.0) {
            return Err(ReconcileError::InvalidValue {
                field: "quantity",
                value: quantity,
            });
        }
        let qty = round_quantity(quantity);
        self.item.quantity = qty;
        if qty > 0.0 {
            let unit = to_decimal(self.item.total_price) / to_decimal(qty);
            self.item.unit_price = to_f64(unit);
        }
        Ok(())
    }

    /// Change the unit price; re-derives the line total
    pub fn set_unit_price(&mut self, unit_price: f64) -> Result<(), ReconcileError> {
        if !(unit_price >= 0.0) {
            return Err(ReconcileError::InvalidValue {
                field: "unit_price",
                value: unit_price,
            });
        }
        let price = round_price(unit_price);
        self.item.unit_price = price;
        let total = to_decimal(price) * to_decimal(self.item.quantity);
        self.item.total_price = to_f64(total);
        Ok(())
    }

    /// Change the line total; re-derives the unit price when quantity > 0
    pub fn set_total_price(&mut self, total_price: f64) -> Result<(), ReconcileError> {
        if !(total_price >= 0.0) {
            return Err(ReconcileError::InvalidValue {
                field: "total_price",
                value: total_price,
            });
        }
        let total = round_price(total_price);
        self.item.total_price = total;
        if self.item.quantity > 0.0 {
            let unit = to_decimal(total) / to_decimal(self.item.quantity);
            self.item.unit_price = to_f64(unit);
        }
        Ok(())
    }
}

/// Reconciles user corrections against the extracted draft
#[derive(Debug, Clone)]
pub struct ReviewReconciler {
    draft: ReceiptDraft,
    original: Vec<LineItem>,
    states: Vec<ItemReviewState>,
    session: Option<EditSession>,
    confirmed: bool,
}

impl ReviewReconciler {
    /// Snapshot the draft's items as the comparison baseline
    pub fn new(draft: ReceiptDraft) -> Self {
        let original = draft.items.clone();
        let states = vec![ItemReviewState::Pending; draft.items.len()];
        Self {
            draft,
            original,
            states,
            session: None,
            confirmed: false,
        }
    }

    pub fn draft(&self) -> &ReceiptDraft {
        &self.draft
    }

    pub fn items(&self) -> &[LineItem] {
        &self.draft.items
    }

    pub fn item_state(&self, index: usize) -> Option<ItemReviewState> {
        self.states.get(index).copied()
    }

    pub fn state(&self) -> ReconcilerState {
        if let Some(session) = &self.session {
            ReconcilerState::Editing(session.index)
        } else if self.confirmed {
            ReconcilerState::Confirmed
        } else {
            ReconcilerState::Reviewing
        }
    }

    /// Item indices with pending items first, otherwise in draft order
    pub fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.draft.items.len()).collect();
        order.sort_by_key(|&i| self.states[i].is_verified());
        order
    }

    /// Indices of items still awaiting review
    pub fn pending_indices(&self) -> Vec<usize> {
        (0..self.states.len())
            .filter(|&i| self.states[i] == ItemReviewState::Pending)
            .collect()
    }

    /// Open an edit session on one item. Only one session at a time.
    pub fn begin_edit(&mut self, index: usize) -> Result<&mut EditSession, ReconcileError> {
        if self.session.is_some() {
            return Err(ReconcileError::EditInProgress);
        }
        let item = self
            .draft
            .items
            .get(index)
            .cloned()
            .ok_or(ReconcileError::IndexOutOfRange(index))?;
        Ok(self.session.insert(EditSession { index, item }))
    }

    /// The open session, if any
    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Write the session's working copy back into the draft and mark the
    /// item verified
    pub fn commit_edit(&mut self) -> Result<(), ReconcileError> {
        let session = self.session.take().ok_or(ReconcileError::NoSession)?;
        let mut item = session.item;
        item.pending_review = false;
        item.user_verified = true;
        self.draft.items[session.index] = item;
        self.states[session.index] = ItemReviewState::Edited;
        Ok(())
    }

    /// Discard the open session; the draft is untouched
    pub fn cancel_edit(&mut self) -> Result<(), ReconcileError> {
        self.session.take().ok_or(ReconcileError::NoSession)?;
        Ok(())
    }

    /// Verify an item without changing any field
    pub fn accept_without_edit(&mut self, index: usize) -> Result<(), ReconcileError> {
        if self.session.is_some() {
            return Err(ReconcileError::EditInProgress);
        }
        let item = self
            .draft
            .items
            .get_mut(index)
            .ok_or(ReconcileError::IndexOutOfRange(index))?;
        item.pending_review = false;
        item.user_verified = true;
        self.states[index] = ItemReviewState::AcceptedAsIs;
        Ok(())
    }

    /// Items whose compared fields differ from the snapshot, in draft order
    pub fn changed_items(&self) -> Vec<ChangedItem> {
        self.draft
            .items
            .iter()
            .zip(self.original.iter())
            .filter(|(current, original)| item_differs(current, original))
            .map(|(current, _)| ChangedItem {
                receipt_item_id: current.receipt_item_id.clone(),
                canonical_name: current.canonical_name.clone(),
                brand: current.brand.clone(),
                category: current.category.clone(),
                subcategory: current.subcategory.clone(),
                size: current.size.clone(),
                unit_type: current.unit_type.clone(),
                quantity: current.quantity,
                total_price: current.total_price,
                user_verified: current.user_verified,
            })
            .collect()
    }

    /// The diff to submit on confirm. Refuses while an edit is open so a
    /// half-finished correction can't slip through.
    pub fn confirm_all(&self) -> Result<Vec<ChangedItem>, ReconcileError> {
        if self.session.is_some() {
            return Err(ReconcileError::EditInProgress);
        }
        Ok(self.changed_items())
    }

    /// Mark the review concluded after a successful confirm
    pub fn mark_confirmed(&mut self) {
        self.confirmed = true;
    }
}

/// Field-by-field comparison against the original snapshot. String fields
/// compare exactly; quantity and total use the shared tolerances so float
/// noise doesn't register as an edit.
fn item_differs(current: &LineItem, original: &LineItem) -> bool {
    current.canonical_name != original.canonical_name
        || current.brand != original.brand
        || current.size != original.size
        || current.unit_type != original.unit_type
        || !quantity_eq(current.quantity, original.quantity)
        || !money_eq(current.total_price, original.total_price)
        || current.user_verified != original.user_verified
}
