//! Declarative menu hierarchy: a root of tabs, each holding submenu options.

use std::{collections::HashSet, fmt};

use once_cell::sync::Lazy;
use thiserror::Error;

/// Identifier reserved for the Back control appended to every submenu.
pub const BACK_ID: &str = "back-main";
/// Label of the Back control.
pub const BACK_LABEL: &str = "Back";

/// The shell's standard menu.
pub static MENU: Lazy<MenuTree> = Lazy::new(MenuTree::standard);

/// Top-level tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Factories and outputs.
    Production,
    /// Workforce.
    Staff,
    /// Trading.
    Market,
    /// Finance.
    Bank,
    /// Reference pages.
    Encyclopedia,
    /// Save management and credits.
    Settings,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 6] = [
        Tab::Production,
        Tab::Staff,
        Tab::Market,
        Tab::Bank,
        Tab::Encyclopedia,
        Tab::Settings,
    ];

    /// Stable lowercase identifier.
    pub fn id(self) -> &'static str {
        match self {
            Tab::Production => "production",
            Tab::Staff => "staff",
            Tab::Market => "market",
            Tab::Bank => "bank",
            Tab::Encyclopedia => "encyclopedia",
            Tab::Settings => "settings",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Tab::Production => "Production",
            Tab::Staff => "Staff",
            Tab::Market => "Market",
            Tab::Bank => "Bank",
            Tab::Encyclopedia => "Encyclopedia",
            Tab::Settings => "Settings",
        }
    }

    /// Resolve a tab from its identifier.
    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Leaf action reachable from a submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Action {
    Factories,
    Resources,
    Outputs,
    Hire,
    Train,
    Assign,
    Buy,
    Sell,
    Upgrade,
    Account,
    Loans,
    Properties,
    Stock,
    Elements,
    Mechanics,
    Glossary,
    Credits,
    SeeRaw,
    Save,
    SaveExit,
}

impl Action {
    /// Stable identifier, unique within its tab.
    pub fn id(self) -> &'static str {
        match self {
            Action::Factories => "factories",
            Action::Resources => "resources",
            Action::Outputs => "outputs",
            Action::Hire => "hire",
            Action::Train => "train",
            Action::Assign => "assign",
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Upgrade => "upgrade",
            Action::Account => "account",
            Action::Loans => "loans",
            Action::Properties => "properties",
            Action::Stock => "stock",
            Action::Elements => "elements",
            Action::Mechanics => "mechanics",
            Action::Glossary => "glossary",
            Action::Credits => "credits",
            Action::SeeRaw => "see-raw",
            Action::Save => "save",
            Action::SaveExit => "save-exit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A submenu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    /// Action dispatched when selected.
    pub action: Action,
    /// Display label.
    pub label: &'static str,
}

impl MenuOption {
    const fn new(action: Action, label: &'static str) -> Self {
        Self { action, label }
    }
}

/// A tab together with its ordered submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabNode {
    /// The tab.
    pub tab: Tab,
    /// Submenu entries in display order, excluding Back.
    pub options: Vec<MenuOption>,
}

/// Borrowed view of the tree for generic traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuNode<'a> {
    /// Node with ordered children.
    Branch {
        /// Identifier unique among siblings.
        id: &'static str,
        /// Display label.
        label: &'static str,
        /// Ordered children.
        children: Vec<MenuNode<'a>>,
    },
    /// Selectable action.
    Leaf {
        /// Identifier unique among siblings.
        id: &'static str,
        /// Display label.
        label: &'static str,
        /// Action dispatched on selection.
        option: &'a MenuOption,
    },
}

impl MenuNode<'_> {
    /// Identifier of the node.
    pub fn id(&self) -> &'static str {
        match self {
            MenuNode::Branch { id, .. } | MenuNode::Leaf { id, .. } => *id,
        }
    }
}

/// Structural problems in a menu definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    /// Two siblings share an identifier.
    #[error("duplicate menu id '{id}' under '{parent}'")]
    DuplicateId {
        /// Identifier of the parent node.
        parent: String,
        /// Repeated identifier.
        id: String,
    },
    /// An option uses the identifier reserved for Back.
    #[error("menu id 'back-main' is reserved (under '{parent}')")]
    ReservedId {
        /// Identifier of the parent node.
        parent: String,
    },
}

/// Immutable menu hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    tabs: Vec<TabNode>,
}

impl MenuTree {
    /// Build a tree, rejecting duplicate sibling identifiers.
    pub fn new(tabs: Vec<TabNode>) -> Result<Self, MenuError> {
        let tree = Self { tabs };
        tree.validate()?;
        Ok(tree)
    }

    /// The game's tabs and submenus.
    pub fn standard() -> Self {
        use Action::*;
        let node = |tab, options: &[MenuOption]| TabNode {
            tab,
            options: options.to_vec(),
        };
        Self {
            tabs: vec![
                node(
                    Tab::Production,
                    &[
                        MenuOption::new(Factories, "Factories"),
                        MenuOption::new(Resources, "Resources"),
                        MenuOption::new(Outputs, "Outputs"),
                    ],
                ),
                node(
                    Tab::Staff,
                    &[
                        MenuOption::new(Hire, "Hire"),
                        MenuOption::new(Train, "Train"),
                        MenuOption::new(Assign, "Assign"),
                    ],
                ),
                node(
                    Tab::Market,
                    &[
                        MenuOption::new(Buy, "Buy"),
                        MenuOption::new(Sell, "Sell"),
                        MenuOption::new(Upgrade, "Upgrade"),
                    ],
                ),
                node(
                    Tab::Bank,
                    &[
                        MenuOption::new(Account, "Account"),
                        MenuOption::new(Loans, "Loans"),
                        MenuOption::new(Properties, "Properties"),
                        MenuOption::new(Stock, "Stock"),
                    ],
                ),
                node(
                    Tab::Encyclopedia,
                    &[
                        MenuOption::new(Elements, "Elements"),
                        MenuOption::new(Mechanics, "Mechanics"),
                        MenuOption::new(Glossary, "Glossary"),
                    ],
                ),
                node(
                    Tab::Settings,
                    &[
                        MenuOption::new(Credits, "Credits"),
                        MenuOption::new(SeeRaw, "See Raw"),
                        MenuOption::new(Save, "Save"),
                        MenuOption::new(SaveExit, "Save & Exit"),
                    ],
                ),
            ],
        }
    }

    /// Tabs in display order.
    pub fn tabs(&self) -> &[TabNode] {
        &self.tabs
    }

    /// Look up a tab's node.
    pub fn tab(&self, tab: Tab) -> Option<&TabNode> {
        self.tabs.iter().find(|node| node.tab == tab)
    }

    /// Root node whose children are the tabs.
    pub fn root(&self) -> MenuNode<'_> {
        MenuNode::Branch {
            id: "root",
            label: "Menu",
            children: self
                .tabs
                .iter()
                .map(|node| MenuNode::Branch {
                    id: node.tab.id(),
                    label: node.tab.label(),
                    children: node
                        .options
                        .iter()
                        .map(|option| MenuNode::Leaf {
                            id: option.action.id(),
                            label: option.label,
                            option,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Check sibling uniqueness and reserved identifiers across the tree.
    pub fn validate(&self) -> Result<(), MenuError> {
        validate_node(&self.root())
    }
}

fn validate_node(node: &MenuNode<'_>) -> Result<(), MenuError> {
    let MenuNode::Branch { id: parent, children, .. } = node else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for child in children {
        if child.id() == BACK_ID {
            return Err(MenuError::ReservedId {
                parent: parent.to_string(),
            });
        }
        if !seen.insert(child.id()) {
            return Err(MenuError::DuplicateId {
                parent: parent.to_string(),
                id: child.id().to_string(),
            });
        }
        validate_node(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tree_is_valid() {
        assert_eq!(MENU.validate(), Ok(()));
        assert_eq!(MENU.tabs().len(), Tab::ALL.len());
        for (node, tab) in MENU.tabs().iter().zip(Tab::ALL) {
            assert_eq!(node.tab, tab);
            assert!(!node.options.is_empty());
        }
    }

    #[test]
    fn settings_submenu_matches_labels() {
        let settings = MENU.tab(Tab::Settings).expect("settings tab");
        let labels: Vec<_> = settings.options.iter().map(|o| o.label).collect();
        assert_eq!(labels, ["Credits", "See Raw", "Save", "Save & Exit"]);
        let ids: Vec<_> = settings.options.iter().map(|o| o.action.id()).collect();
        assert_eq!(ids, ["credits", "see-raw", "save", "save-exit"]);
    }

    #[test]
    fn rejects_duplicate_sibling_ids() {
        let tabs = vec![TabNode {
            tab: Tab::Market,
            options: vec![
                MenuOption::new(Action::Buy, "Buy"),
                MenuOption::new(Action::Buy, "Buy again"),
            ],
        }];
        assert_eq!(
            MenuTree::new(tabs),
            Err(MenuError::DuplicateId {
                parent: "market".to_string(),
                id: "buy".to_string(),
            })
        );

        let tabs = vec![
            TabNode {
                tab: Tab::Bank,
                options: Vec::new(),
            },
            TabNode {
                tab: Tab::Bank,
                options: Vec::new(),
            },
        ];
        assert!(matches!(
            MenuTree::new(tabs),
            Err(MenuError::DuplicateId { .. })
        ));
    }

    #[test]
    fn tab_ids_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_id(tab.id()), Some(tab));
        }
        assert_eq!(Tab::from_id("back-main"), None);
    }
}
