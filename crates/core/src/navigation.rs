//! Sidebar navigation model.
//!
//! The sidebar is computed from an explicit [`Capabilities`] value so the
//! same rules drive both the API payload and any server-side rendering.

use serde::Serialize;

use crate::capability::Capabilities;
use crate::roles::{PERM_ACCESS_SETTINGS, PERM_VIEW_USERS, ROLE_SUPER_ADMIN};

/// A single link in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
    pub icon: &'static str,
}

/// A labelled group of links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub label: &'static str,
    pub items: Vec<NavItem>,
}

/// The full sidebar: main sections plus the footer links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sidebar {
    pub sections: Vec<NavSection>,
    pub footer: Vec<NavItem>,
}

const DASHBOARD: NavItem = NavItem {
    title: "Dashboard",
    href: "/dashboard",
    icon: "layout-grid",
};

const ADMINISTRATION: NavItem = NavItem {
    title: "Administration",
    href: "/admin",
    icon: "users-round",
};

const USERS: NavItem = NavItem {
    title: "Users",
    href: "/admin/users",
    icon: "users-round",
};

const ACCESS_CONTROL: NavItem = NavItem {
    title: "Access Control",
    href: "/admin/access-control",
    icon: "shield",
};

const SETTINGS: NavItem = NavItem {
    title: "Settings",
    href: "/settings/profile",
    icon: "settings",
};

const SUPPORT: NavItem = NavItem {
    title: "Support",
    href: "#",
    icon: "headset",
};

const CONTACT: NavItem = NavItem {
    title: "Contact Us",
    href: "#",
    icon: "mail",
};

/// Build the sidebar for a user holding `caps`.
///
/// - "Platform" (Dashboard, plus Settings with `access-settings`) is always present.
/// - "Administrator" appears with `view-users`; it gains "Access Control"
///   for Super Admins.
pub fn build_sidebar(caps: &Capabilities) -> Sidebar {
    let mut platform = vec![DASHBOARD];
    if caps.can(PERM_ACCESS_SETTINGS) {
        platform.push(SETTINGS);
    }

    let mut sections = vec![NavSection {
        label: "Platform",
        items: platform,
    }];

    if caps.can(PERM_VIEW_USERS) {
        let mut admin = vec![ADMINISTRATION, USERS];
        if caps.has_role(ROLE_SUPER_ADMIN) {
            admin.push(ACCESS_CONTROL);
        }
        sections.push(NavSection {
            label: "Administrator",
            items: admin,
        });
    }

    Sidebar {
        sections,
        footer: vec![SUPPORT, CONTACT],
    }
}
