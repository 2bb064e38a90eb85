use metagen_core::search::SearchKey;
use metagen_lists::IntervalView;

use crate::variant::{Variant, VariantDisplayList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    BeforeStart,
    OnElement(usize),
    AfterEnd,
}

///
/// Bidirectional cursor over a [`VariantDisplayList`].
///
/// When `display_dependant` is set, hidden variants are skipped and the
/// iterator behaves as if the list held only visible variants. Otherwise
/// visibility is ignored.
///
/// The cursor borrows the list: each consumer creates its own.
///
#[derive(Debug, Clone)]
pub struct VariantDisplayListIterator<'a> {
    list: &'a VariantDisplayList,
    cursor: Cursor,
    display_dependant: bool,
}

impl<'a> VariantDisplayListIterator<'a> {
    pub fn new(list: &'a VariantDisplayList, display_dependant: bool) -> Self {
        VariantDisplayListIterator {
            list,
            cursor: Cursor::BeforeStart,
            display_dependant,
        }
    }

    pub fn is_display_dependant(&self) -> bool {
        self.display_dependant
    }

    fn accepts(&self, variant: &Variant) -> bool {
        !self.display_dependant || variant.is_visible()
    }

    /// Index of the next accepted variant after the cursor.
    fn next_index(&self) -> Option<usize> {
        let first = match self.cursor {
            Cursor::BeforeStart => 0,
            Cursor::OnElement(i) => i + 1,
            Cursor::AfterEnd => return None,
        };
        (first..self.list.len()).find(|&i| self.accepts(&self.list.variants()[i]))
    }

    /// Index of the previous accepted variant before the cursor.
    fn previous_index(&self) -> Option<usize> {
        let end = match self.cursor {
            Cursor::BeforeStart => return None,
            Cursor::OnElement(i) => i,
            Cursor::AfterEnd => self.list.len(),
        };
        (0..end).rev().find(|&i| self.accepts(&self.list.variants()[i]))
    }

    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    /// Move back one variant. Past the first one the cursor rests before the start.
    pub fn previous(&mut self) -> Option<&'a Variant> {
        match self.previous_index() {
            Some(i) => {
                self.cursor = Cursor::OnElement(i);
                self.list.variant(i)
            }
            None => {
                self.cursor = Cursor::BeforeStart;
                None
            }
        }
    }

    pub fn current_variant(&self) -> Option<&'a Variant> {
        match self.cursor {
            Cursor::OnElement(i) => self.list.variant(i),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::OnElement(i) => Some(i),
            _ => None,
        }
    }

    ///
    /// Put the cursor on the variant containing the meta position
    /// `position`, or on the first variant after it. A position before the
    /// first variant lands on the first one, a position after the last
    /// variant on the last one. Only an empty list leaves the cursor before
    /// the start. Visibility is not considered.
    ///
    pub fn set_iterator_position(&mut self, position: u32) {
        self.cursor = match self.list.search(position, SearchKey::Containment) {
            Some(i) => Cursor::OnElement(i),
            None => Cursor::BeforeStart,
        };
    }

    /// Whether an accepted variant starts after `position`, scanning
    /// forward from the cursor.
    pub fn has_variant_after_position(&self, position: u32) -> bool {
        let first = match self.cursor {
            Cursor::BeforeStart => 0,
            Cursor::OnElement(i) => i,
            Cursor::AfterEnd => return false,
        };
        self.list.variants()[first..]
            .iter()
            .any(|variant| self.accepts(variant) && variant.meta_start > position)
    }

    /// Whether an accepted variant ends at or before `position`, scanning
    /// backward from the cursor.
    pub fn has_variant_before_position(&self, position: u32) -> bool {
        let end = match self.cursor {
            Cursor::BeforeStart => return false,
            Cursor::OnElement(i) => i + 1,
            Cursor::AfterEnd => self.list.len(),
        };
        self.list.variants()[..end]
            .iter()
            .rev()
            .any(|variant| self.accepts(variant) && variant.meta_stop <= position)
    }

    pub fn reset(&mut self) {
        self.cursor = Cursor::BeforeStart;
    }
}

impl<'a> Iterator for VariantDisplayListIterator<'a> {
    type Item = &'a Variant;

    /// Move forward one variant. Past the last one the cursor rests after the end.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_index() {
            Some(i) => {
                self.cursor = Cursor::OnElement(i);
                self.list.variant(i)
            }
            None => {
                self.cursor = Cursor::AfterEnd;
                None
            }
        }
    }
}
