// src/menu/tree.rs

//! Composition of items, submenus and separators into a menu tree.

use crate::config::model::MenuItemConfig;
use crate::diag::Diagnostics;
use crate::menu::{CommandItem, Effect, ItemId, SwitchItem};
use crate::surface::SurfaceNode;

/// One node of the built tree.
#[derive(Debug)]
pub enum MenuItem {
    Command(CommandItem),
    Switch(SwitchItem),
    SubMenu(SubMenu),
    Separator,
}

#[derive(Debug)]
pub struct SubMenu {
    pub title: String,
    pub icon: Option<String>,
    pub items: Vec<MenuItem>,
}

/// The ordered item tree built from parsed configuration.
///
/// The tree owns every item; events are routed to items by their
/// [`ItemId`], and cancellation recurses depth-first over the children.
#[derive(Debug, Default)]
pub struct MenuTree {
    items: Vec<MenuItem>,
}

impl MenuTree {
    pub fn build(configs: Vec<MenuItemConfig>, diag: &Diagnostics) -> Self {
        let mut next_id = 0u32;
        let items = build_items(configs, &mut next_id, diag);
        Self { items }
    }

    /// Initial effects: every switch enqueues its first check.
    pub fn startup(&mut self, diag: &Diagnostics) -> Vec<(ItemId, Effect)> {
        let mut effects = Vec::new();
        for_each_item(&mut self.items, &mut |item| {
            if let MenuItem::Switch(switch) = item {
                let id = switch.id();
                effects.extend(switch.startup(diag).into_iter().map(|e| (id, e)));
            }
        });
        effects
    }

    /// Depth-first cancellation of every item. Separators have nothing to
    /// cancel.
    pub fn cancel(&mut self, diag: &Diagnostics) -> Vec<(ItemId, Effect)> {
        let mut effects = Vec::new();
        for_each_item(&mut self.items, &mut |item| match item {
            MenuItem::Command(command) => {
                let id = command.id();
                effects.extend(command.cancel(diag).into_iter().map(|e| (id, e)));
            }
            MenuItem::Switch(switch) => {
                let id = switch.id();
                effects.extend(switch.cancel(diag).into_iter().map(|e| (id, e)));
            }
            MenuItem::SubMenu(_) | MenuItem::Separator => {}
        });
        effects
    }

    pub fn find_command(&mut self, id: ItemId) -> Option<&mut CommandItem> {
        match find_item(&mut self.items, id) {
            Some(MenuItem::Command(command)) => Some(command),
            _ => None,
        }
    }

    pub fn find_switch(&mut self, id: ItemId) -> Option<&mut SwitchItem> {
        match find_item(&mut self.items, id) {
            Some(MenuItem::Switch(switch)) => Some(switch),
            _ => None,
        }
    }

    /// Render the layout handed to the surface on install.
    pub fn layout(&self) -> Vec<SurfaceNode> {
        layout_items(&self.items)
    }
}

fn build_items(
    configs: Vec<MenuItemConfig>,
    next_id: &mut u32,
    diag: &Diagnostics,
) -> Vec<MenuItem> {
    let mut items = Vec::with_capacity(configs.len());
    for config in configs {
        let item = match config {
            MenuItemConfig::Command(config) => {
                let id = allocate(next_id);
                MenuItem::Command(CommandItem::new(id, config, diag))
            }
            MenuItemConfig::Switch(config) => {
                let id = allocate(next_id);
                MenuItem::Switch(SwitchItem::new(id, config, diag))
            }
            MenuItemConfig::SubMenu { title, icon, items } => MenuItem::SubMenu(SubMenu {
                title,
                icon,
                items: build_items(items, next_id, diag),
            }),
            MenuItemConfig::Separator => MenuItem::Separator,
        };
        items.push(item);
    }
    items
}

fn allocate(next_id: &mut u32) -> ItemId {
    let id = ItemId(*next_id);
    *next_id += 1;
    id
}

fn find_item(items: &mut [MenuItem], id: ItemId) -> Option<&mut MenuItem> {
    for item in items {
        let matches = match &*item {
            MenuItem::Command(command) => command.id() == id,
            MenuItem::Switch(switch) => switch.id() == id,
            _ => false,
        };
        if matches {
            return Some(item);
        }
        if let MenuItem::SubMenu(submenu) = item {
            if let Some(found) = find_item(&mut submenu.items, id) {
                return Some(found);
            }
        }
    }
    None
}

fn for_each_item(items: &mut [MenuItem], f: &mut impl FnMut(&mut MenuItem)) {
    for item in items {
        if let MenuItem::SubMenu(submenu) = item {
            for_each_item(&mut submenu.items, f);
        } else {
            f(item);
        }
    }
}

fn layout_items(items: &[MenuItem]) -> Vec<SurfaceNode> {
    items
        .iter()
        .map(|item| match item {
            MenuItem::Command(command) => SurfaceNode::Command {
                id: command.id(),
                title: command.title().to_string(),
                icon: command.icon().map(str::to_string),
                enabled: command.initially_sensitive(),
            },
            MenuItem::Switch(switch) => SurfaceNode::Switch {
                id: switch.id(),
                title: switch.title().to_string(),
                icon: switch.icon().map(str::to_string),
            },
            MenuItem::SubMenu(submenu) => SurfaceNode::SubMenu {
                title: submenu.title.clone(),
                icon: submenu.icon.clone(),
                children: layout_items(&submenu.items),
            },
            MenuItem::Separator => SurfaceNode::Separator,
        })
        .collect()
}
