//! Message translation.
//!
//! Text shown to users is written in English in the code and looked up in a
//! language catalog at render time. Unknown messages are returned unchanged.

use std::collections::HashMap;

/// Maps a message id to localized display text.
pub trait Translator: Send + Sync {
    fn translate(&self, msgid: &str) -> String;
}

/// In-memory message catalog for one language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: String,
    messages: HashMap<&'static str, &'static str>,
}

impl Catalog {
    /// Catalog that returns every message unchanged.
    pub fn identity() -> Self {
        Self {
            language: "en".to_string(),
            messages: HashMap::new(),
        }
    }

    /// Brazilian Portuguese catalog.
    pub fn portuguese() -> Self {
        Self {
            language: "pt-br".to_string(),
            messages: PT_BR.iter().copied().collect(),
        }
    }

    /// Pick a catalog by language code; unknown codes fall back to English.
    pub fn for_language(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Self::portuguese(),
            _ => Self::identity(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Translator for Catalog {
    fn translate(&self, msgid: &str) -> String {
        self.messages
            .get(msgid)
            .copied()
            .unwrap_or(msgid)
            .to_string()
    }
}

const PT_BR: &[(&str, &str)] = &[
    // Menu
    ("Main", "Principal"),
    ("Dashboard", "Dashboard"),
    ("Sales", "Vendas"),
    ("Sales List", "Lista de Vendas"),
    ("New Sale", "Nova Venda"),
    ("Sales Reports", "Relatórios de Vendas"),
    ("Customers", "Clientes"),
    ("Inventory", "Estoque"),
    ("Products", "Produtos"),
    ("Product List", "Lista de Produtos"),
    ("New Product", "Novo Produto"),
    ("Categories", "Categorias"),
    ("Stock Control", "Controle de Estoque"),
    ("Financial", "Financeiro"),
    ("Overview", "Visão Geral"),
    ("Accounts Receivable", "Contas a Receber"),
    ("Accounts Payable", "Contas a Pagar"),
    ("Reports", "Relatórios"),
    ("General Reports", "Relatórios Gerais"),
    ("System", "Sistema"),
    ("Settings", "Configurações"),
    ("Administration", "Administração"),
    // Page titles
    ("Login", "Login"),
    ("Register", "Registrar"),
    ("My Profile", "Meu Perfil"),
    ("Edit Profile", "Editar Perfil"),
    ("Change Password", "Alterar Senha"),
    ("Users", "Usuários"),
    ("Under Construction", "Em Construção"),
    // Roles
    ("Administrator", "Administrador"),
    ("Manager", "Gerente"),
    ("Supervisor", "Supervisor"),
    ("User", "Usuário"),
    ("Guest", "Convidado"),
    // Messages
    ("Welcome back, {name}!", "Bem-vindo de volta, {name}!"),
    ("Invalid username or password.", "Usuário ou senha inválidos."),
    ("Please correct the errors below.", "Por favor, corrija os erros abaixo."),
    ("You have been logged out.", "Você saiu do sistema com sucesso."),
    (
        "Account created for {username}! You can now log in.",
        "Conta criada com sucesso para {username}! Você já pode fazer login.",
    ),
    ("Your profile has been updated!", "Seu perfil foi atualizado com sucesso!"),
    ("Your password has been changed!", "Sua senha foi alterada com sucesso!"),
    ("This email is already registered.", "Este email já está cadastrado."),
    (
        "A user with that username already exists.",
        "Um usuário com este nome já existe.",
    ),
    ("The two password fields didn't match.", "Os dois campos de senha não conferem."),
    (
        "Your old password was entered incorrectly.",
        "Sua senha antiga foi digitada incorretamente.",
    ),
    (
        "You do not have permission to access this page.",
        "Você não tem permissão para acessar esta página.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_returns_msgid() {
        assert_eq!(Catalog::identity().translate("Sales"), "Sales");
    }

    #[test]
    fn test_portuguese_translates_known_messages() {
        let catalog = Catalog::portuguese();
        assert_eq!(catalog.translate("Stock Control"), "Controle de Estoque");
        assert_eq!(catalog.translate("Administration"), "Administração");
    }

    #[test]
    fn test_unknown_message_passes_through() {
        assert_eq!(Catalog::portuguese().translate("Nonexistent"), "Nonexistent");
    }

    #[test]
    fn test_for_language_fallback() {
        assert_eq!(Catalog::for_language("PT-BR").language(), "pt-br");
        assert_eq!(Catalog::for_language("de").language(), "en");
    }
}
