//! Permission-scoped navigation menu.
//!
//! The menu is a small forest of [`MenuNode`]s rebuilt for every request.
//! Each node may declare the permissions it requires; a viewer sees a node
//! when it holds at least one of them. Visibility is evaluated one level at a
//! time while rendering, so a parent stays visible even when every child is
//! filtered out.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::constants::DEFAULT_MENU_ICON;
use crate::error::DomainResult;
use crate::i18n::Translator;
use crate::permission::Viewer;

/// Stable node keys.
pub mod keys {
    pub const MAIN: &str = "main";
    pub const DASHBOARD: &str = "main.dashboard";
    pub const SALES: &str = "sales";
    pub const SALES_ORDERS: &str = "sales.orders";
    pub const SALES_CUSTOMERS: &str = "sales.customers";
    pub const INVENTORY: &str = "inventory";
    pub const INVENTORY_PRODUCTS: &str = "inventory.products";
    pub const FINANCIAL: &str = "financial";
    pub const REPORTS: &str = "reports";
    pub const SYSTEM: &str = "system";
    pub const SYSTEM_SETTINGS: &str = "system.settings";
    pub const SYSTEM_ADMIN: &str = "system.admin";
}

/// Route names resolved while building the menu.
pub const ROUTE_DASHBOARD: &str = "dashboard";
pub const ROUTE_ADMIN_INDEX: &str = "admin:index";

/// Resolves a symbolic route name to a URL path.
pub trait RouteResolver {
    /// # Errors
    /// Returns [`DomainError::UnknownRoute`](crate::DomainError::UnknownRoute)
    /// when no route carries the name.
    fn reverse(&self, name: &str) -> DomainResult<String>;
}

// =============================================================================
// Menu Node
// =============================================================================

/// One entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub key: String,
    pub title: String,
    /// Absent for pure section headers
    pub url: Option<String>,
    pub icon: String,
    /// Empty means visible to anyone who can see the parent
    pub required_permissions: BTreeSet<String>,
    /// Display order is insertion order
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            url: None,
            icon: DEFAULT_MENU_ICON.to_string(),
            required_permissions: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Require any one of the given permissions.
    pub fn requires<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn child(mut self, child: MenuNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Whether the viewer may see this node itself (ancestors not considered).
///
/// True when no permission is required, otherwise when the viewer holds any
/// one of the required permissions.
pub fn has_permission<V: Viewer + ?Sized>(node: &MenuNode, viewer: &V) -> bool {
    node.required_permissions.is_empty()
        || node
            .required_permissions
            .iter()
            .any(|permission| viewer.has_perm(permission))
}

/// Direct children the viewer may see, in display order.
///
/// Filters one level only; grandchildren are not inspected.
pub fn visible_children<'a, V: Viewer + ?Sized>(
    node: &'a MenuNode,
    viewer: &V,
) -> Vec<&'a MenuNode> {
    node.children
        .iter()
        .filter(|child| has_permission(child, viewer))
        .collect()
}

/// Whether the node or any of its descendants matches the current path.
///
/// A node matches when its URL is non-empty and a prefix of the path.
/// Descendants are checked regardless of the viewer's permissions.
pub fn is_active(node: &MenuNode, current_path: &str) -> bool {
    let matches_self = node
        .url
        .as_deref()
        .is_some_and(|url| !url.is_empty() && current_path.starts_with(url));

    matches_self || node.children.iter().any(|child| is_active(child, current_path))
}

/// Depth-first lookup by key.
pub fn find<'a>(nodes: &'a [MenuNode], key: &str) -> Option<&'a MenuNode> {
    for node in nodes {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find(&node.children, key) {
            return Some(found);
        }
    }
    None
}

/// Depth-first mutable lookup by key.
pub fn find_mut<'a>(nodes: &'a mut [MenuNode], key: &str) -> Option<&'a mut MenuNode> {
    for node in nodes.iter_mut() {
        if node.key == key {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, key) {
            return Some(found);
        }
    }
    None
}

// =============================================================================
// Construction
// =============================================================================

/// Build the complete, unfiltered menu for a viewer.
///
/// Every call returns a fresh forest. The only viewer-dependent parts are
/// the System section (staff and superusers) and its Administration entry
/// (superusers). Permission filtering happens at render time.
///
/// # Errors
/// Propagates the resolver's error when a route name is unknown.
pub fn build_menu<V, R, T>(viewer: &V, routes: &R, tr: &T) -> DomainResult<Vec<MenuNode>>
where
    V: Viewer + ?Sized,
    R: RouteResolver + ?Sized,
    T: Translator + ?Sized,
{
    let mut menu = vec![
        MenuNode::new(keys::MAIN, tr.translate("Main")).child(
            MenuNode::new(keys::DASHBOARD, tr.translate("Dashboard"))
                .url(routes.reverse(ROUTE_DASHBOARD)?)
                .icon("bi bi-speedometer2"),
        ),
        MenuNode::new(keys::SALES, tr.translate("Sales"))
            .requires(["sales.view_sale", "sales.view_customer"])
            .child(
                MenuNode::new(keys::SALES_ORDERS, tr.translate("Sales"))
                    .icon("bi bi-cart")
                    .requires(["sales.view_sale"])
                    .child(
                        MenuNode::new("sales.orders.list", tr.translate("Sales List"))
                            .url("/temp/sales/list/")
                            .icon("bi bi-list-ul")
                            .requires(["sales.view_sale"]),
                    )
                    .child(
                        MenuNode::new("sales.orders.new", tr.translate("New Sale"))
                            .url("/temp/sales/new/")
                            .icon("bi bi-plus-circle")
                            .requires(["sales.add_sale"]),
                    )
                    .child(
                        MenuNode::new("sales.orders.reports", tr.translate("Sales Reports"))
                            .url("/temp/sales/reports/")
                            .icon("bi bi-graph-up")
                            .requires(["sales.view_sale"]),
                    ),
            )
            .child(
                MenuNode::new(keys::SALES_CUSTOMERS, tr.translate("Customers"))
                    .url("/temp/customers/")
                    .icon("bi bi-people")
                    .requires(["sales.view_customer"]),
            ),
        MenuNode::new(keys::INVENTORY, tr.translate("Inventory"))
            .requires(["inventory.view_product"])
            .child(
                MenuNode::new(keys::INVENTORY_PRODUCTS, tr.translate("Products"))
                    .icon("bi bi-box-seam")
                    .requires(["inventory.view_product"])
                    .child(
                        MenuNode::new("inventory.products.list", tr.translate("Product List"))
                            .url("/temp/inventory/products/")
                            .icon("bi bi-list-ul")
                            .requires(["inventory.view_product"]),
                    )
                    .child(
                        MenuNode::new("inventory.products.new", tr.translate("New Product"))
                            .url("/temp/inventory/products/new/")
                            .icon("bi bi-plus-circle")
                            .requires(["inventory.add_product"]),
                    )
                    .child(
                        MenuNode::new("inventory.categories", tr.translate("Categories"))
                            .url("/temp/inventory/categories/")
                            .icon("bi bi-tags")
                            .requires(["inventory.view_category"]),
                    )
                    .child(
                        MenuNode::new("inventory.stock", tr.translate("Stock Control"))
                            .url("/temp/inventory/stock/")
                            .icon("bi bi-boxes")
                            .requires(["inventory.view_stock"]),
                    ),
            ),
        MenuNode::new(keys::FINANCIAL, tr.translate("Financial"))
            .requires(["financial.view_transaction"])
            .child(
                MenuNode::new("financial.overview", tr.translate("Overview"))
                    .url("/temp/financial/overview/")
                    .icon("bi bi-cash-coin")
                    .requires(["financial.view_transaction"]),
            )
            .child(
                MenuNode::new("financial.receivables", tr.translate("Accounts Receivable"))
                    .url("/temp/financial/receivables/")
                    .icon("bi bi-arrow-down-circle")
                    .requires(["financial.view_receivable"]),
            )
            .child(
                MenuNode::new("financial.payables", tr.translate("Accounts Payable"))
                    .url("/temp/financial/payables/")
                    .icon("bi bi-arrow-up-circle")
                    .requires(["financial.view_payable"]),
            ),
        MenuNode::new(keys::REPORTS, tr.translate("Reports"))
            .requires(["reports.view_report"])
            .child(
                MenuNode::new("reports.general", tr.translate("General Reports"))
                    .url("/temp/reports/")
                    .icon("bi bi-file-earmark-bar-graph")
                    .requires(["reports.view_report"]),
            ),
    ];

    if viewer.is_staff() || viewer.is_superuser() {
        menu.push(
            MenuNode::new(keys::SYSTEM, tr.translate("System")).child(
                MenuNode::new(keys::SYSTEM_SETTINGS, tr.translate("Settings"))
                    .url("#")
                    .icon("bi bi-gear"),
            ),
        );
    }

    if viewer.is_superuser() {
        let admin = MenuNode::new(keys::SYSTEM_ADMIN, tr.translate("Administration"))
            .url(routes.reverse(ROUTE_ADMIN_INDEX)?)
            .icon("bi bi-shield-lock");
        if let Some(system) = find_mut(&mut menu, keys::SYSTEM) {
            system.children.push(admin);
        }
    }

    Ok(menu)
}

// =============================================================================
// Rendering
// =============================================================================

/// A visible node annotated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub key: String,
    pub title: String,
    pub url: Option<String>,
    pub icon: String,
    pub active: bool,
    /// Visible children only
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    fn project<V: Viewer + ?Sized>(node: &MenuNode, viewer: &V, current_path: &str) -> Self {
        Self {
            key: node.key.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            icon: node.icon.clone(),
            active: is_active(node, current_path),
            children: visible_children(node, viewer)
                .into_iter()
                .map(|child| Self::project(child, viewer, current_path))
                .collect(),
        }
    }
}

/// Build the menu and reduce it to what the viewer may see.
///
/// Top-level nodes are filtered with [`has_permission`], deeper levels with
/// [`visible_children`]; every entry is marked with [`is_active`].
pub fn render_menu<V, R, T>(
    viewer: &V,
    routes: &R,
    tr: &T,
    current_path: &str,
) -> DomainResult<Vec<MenuEntry>>
where
    V: Viewer + ?Sized,
    R: RouteResolver + ?Sized,
    T: Translator + ?Sized,
{
    let menu = build_menu(viewer, routes, tr)?;
    Ok(menu
        .iter()
        .filter(|node| has_permission(node, viewer))
        .map(|node| MenuEntry::project(node, viewer, current_path))
        .collect())
}
