//! Hit-testing for mouse input. The renderer registers every interactive
//! region once per frame; the mouse handler resolves a point to a message at
//! the root instead of wiring handlers per element.

use tuirealm::ratatui::layout::Rect;

use super::messages::Message;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionLayer {
    Base,
    Dialog,
}

impl InteractionLayer {
    fn priority(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Dialog => 1,
        }
    }
}

/// What a region is, independent of the message it carries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ElementRole {
    TextInput,
    Button,
    FilterButton,
    TaskRow,
    Checkbox,
    DialogButton,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InteractionNode {
    pub rect: Rect,
    pub role: ElementRole,
    pub message: Message,
    pub layer: InteractionLayer,
}

impl InteractionNode {
    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.rect.x
            && col < self.rect.x.saturating_add(self.rect.width)
            && row >= self.rect.y
            && row < self.rect.y.saturating_add(self.rect.height)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InteractionMap {
    nodes: Vec<InteractionNode>,
}

impl InteractionMap {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn register(
        &mut self,
        layer: InteractionLayer,
        role: ElementRole,
        rect: Rect,
        message: Message,
    ) {
        self.nodes.push(InteractionNode {
            rect,
            role,
            message,
            layer,
        });
    }

    pub fn resolve_message(&self, col: u16, row: u16) -> Option<Message> {
        self.resolve_node(col, row).map(|node| node.message.clone())
    }

    /// Highest layer wins; within a layer the latest registration wins, so
    /// buttons registered after their row take precedence over it.
    pub fn resolve_node(&self, col: u16, row: u16) -> Option<&InteractionNode> {
        let mut best: Option<(usize, &InteractionNode)> = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.contains(col, row) {
                continue;
            }
            match best {
                None => best = Some((idx, node)),
                Some((best_idx, best_node)) => {
                    let has_higher_layer = node.layer.priority() > best_node.layer.priority();
                    let same_layer_later_registration =
                        node.layer.priority() == best_node.layer.priority() && idx > best_idx;
                    if has_higher_layer || same_layer_later_registration {
                        best = Some((idx, node));
                    }
                }
            }
        }
        best.map(|(_, node)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusFilter;

    #[test]
    fn resolve_prefers_higher_layer() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(10, 10, 5, 2);

        map.register(
            InteractionLayer::Dialog,
            ElementRole::DialogButton,
            rect,
            Message::DismissDialog,
        );
        map.register(
            InteractionLayer::Base,
            ElementRole::FilterButton,
            rect,
            Message::SetFilter(StatusFilter::All),
        );

        let message = map.resolve_message(11, 10);
        assert_eq!(message, Some(Message::DismissDialog));
    }

    #[test]
    fn button_registered_after_row_wins_clicks() {
        let mut map = InteractionMap::default();
        map.register(
            InteractionLayer::Base,
            ElementRole::TaskRow,
            Rect::new(0, 4, 40, 1),
            Message::SelectTask(7),
        );
        map.register(
            InteractionLayer::Base,
            ElementRole::Checkbox,
            Rect::new(2, 4, 3, 1),
            Message::ToggleTask(7),
        );

        assert_eq!(
            map.resolve_message(3, 4),
            Some(Message::ToggleTask(7))
        );
        assert_eq!(
            map.resolve_message(20, 4),
            Some(Message::SelectTask(7))
        );
    }

    #[test]
    fn resolved_node_reports_role() {
        let mut map = InteractionMap::default();
        map.register(
            InteractionLayer::Base,
            ElementRole::TaskRow,
            Rect::new(0, 4, 40, 1),
            Message::SelectTask(7),
        );
        map.register(
            InteractionLayer::Base,
            ElementRole::Button,
            Rect::new(30, 4, 6, 1),
            Message::RequestDelete(7),
        );

        let button = map.resolve_node(32, 4).expect("button should be hit");
        assert_eq!(button.role, ElementRole::Button);
        let row = map.resolve_node(10, 4).expect("row should be hit");
        assert_eq!(row.role, ElementRole::TaskRow);
        assert_eq!(map.resolve_node(32, 9), None);
    }

    #[test]
    fn clear_drops_all_nodes() {
        let mut map = InteractionMap::default();
        map.register(
            InteractionLayer::Base,
            ElementRole::Button,
            Rect::new(0, 0, 1, 1),
            Message::SubmitNewTask,
        );
        assert_eq!(map.len(), 1);
        map.clear();
        assert!(map.is_empty());
    }
}
