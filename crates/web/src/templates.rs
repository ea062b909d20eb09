//! Tera template engine and page rendering.
//!
//! Templates are compiled into the binary. Every page extends `base.html`,
//! which expects the shared context assembled by [`Page::render`]: the
//! translated title, the current user, the rendered menu, flash messages and
//! the named route table.

use std::collections::HashMap;
use std::sync::Arc;

use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use common::{AppError, AppResult};
use domain::{render_menu, Catalog, Translator, Viewer};

use crate::flash::FlashMessage;
use crate::middleware::CurrentUser;
use crate::state::AppState;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("menu.html", include_str!("../templates/menu.html")),
    ("forms.html", include_str!("../templates/forms.html")),
    ("dashboard.html", include_str!("../templates/pages/dashboard.html")),
    ("temp_page.html", include_str!("../templates/pages/temp_page.html")),
    ("login.html", include_str!("../templates/accounts/login.html")),
    ("register.html", include_str!("../templates/accounts/register.html")),
    ("profile.html", include_str!("../templates/accounts/profile.html")),
    ("profile_edit.html", include_str!("../templates/accounts/profile_edit.html")),
    ("password_change.html", include_str!("../templates/accounts/password_change.html")),
    ("user_list.html", include_str!("../templates/accounts/user_list.html")),
    ("user_detail.html", include_str!("../templates/accounts/user_detail.html")),
    ("admin_index.html", include_str!("../templates/admin/index.html")),
];

/// Compiled templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new(translator: Arc<Catalog>) -> AppResult<Self> {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera, translator);
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(|e| AppError::Template(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera, translator: Arc<Catalog>) {
        // `{{ "Users" | t }}` looks the text up in the message catalog
        tera.register_filter(
            "t",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let msgid = tera::try_get_value!("t", "value", String, value);
                Ok(tera::Value::String(translator.translate(&msgid)))
            },
        );
    }

    pub fn render(&self, template: &str, context: &Context) -> AppResult<String> {
        self.tera.render(template, context).map_err(|e| {
            // Tera nests the useful part of the message in the source chain
            let mut detail = e.to_string();
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                detail = format!("{}: {}", detail, cause);
                source = cause.source();
            }
            AppError::Template(detail)
        })
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

/// A page about to be rendered.
pub struct Page {
    template: &'static str,
    title: String,
    context: Context,
    messages: Vec<FlashMessage>,
}

impl Page {
    /// `title` is an untranslated message id.
    pub fn new(template: &'static str, title: impl Into<String>) -> Self {
        Self {
            template,
            title: title.into(),
            context: Context::new(),
            messages: Vec::new(),
        }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn messages(mut self, messages: Vec<FlashMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Add a message shown on this render only.
    pub fn message(mut self, message: FlashMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn render(
        self,
        state: &AppState,
        user: Option<&CurrentUser>,
        current_path: &str,
    ) -> AppResult<Html<String>> {
        let mut context = self.context;
        let tr = state.translator.as_ref();

        context.insert("title", &tr.translate(&self.title));
        context.insert("language", state.translator.language());
        context.insert("current_path", current_path);
        context.insert("urls", state.routes.table());
        context.insert("messages", &self.messages);

        match user {
            Some(user) => {
                let menu = render_menu(user, state.routes.as_ref(), tr, current_path)?;
                context.insert("menu", &menu);
                context.insert("user", user.user());
                context.insert("is_staff", &user.is_staff());
                context.insert("is_superuser", &user.is_superuser());
            }
            None => {
                context.insert("menu", &Vec::<()>::new());
                context.insert("is_staff", &false);
                context.insert("is_superuser", &false);
            }
        }

        let html = state.templates.render(self.template, &context)?;
        Ok(Html(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new(Arc::new(Catalog::identity()));
        assert!(templates.is_ok());
    }

    #[test]
    fn test_translate_filter() {
        let mut tera = Tera::default();
        Templates::register_filters(&mut tera, Arc::new(Catalog::portuguese()));
        tera.add_raw_template("test", "{{ \"Users\" | t }}").unwrap();

        let rendered = tera.render("test", &Context::new()).unwrap();
        assert_eq!(rendered, "Usuários");
    }
}
