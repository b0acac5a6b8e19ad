//! Server-rendered pages

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::{
    flash::FlashMessage,
    forms::{AddBookForm, FieldErrors, LoginForm, RegisterForm},
};
use crate::models::{BookDetails, Capability, LoanDetails, Role, UserClaims};

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 60rem; margin: 0 auto; padding: 1rem; }
nav a { margin-right: 1rem; }
.flash { padding: .5rem 1rem; margin: .5rem 0; border-radius: 4px; }
.flash-success { background: #dff0d8; }
.flash-info { background: #d9edf7; }
.flash-danger { background: #f2dede; }
.error { color: #a94442; font-size: .9em; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .3rem .5rem; border-bottom: 1px solid #ddd; }
label { display: block; margin-top: .5rem; }
"#;

/// Page chrome: navigation and queued flash messages
pub fn layout(title: &str, user: Option<&UserClaims>, flashes: &[FlashMessage], body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Libris" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav {
                    a href="/home" { "Home" }
                    @if let Some(user) = user {
                        a href="/borrow_book" { "Borrow" }
                        a href="/return_book" { "Return" }
                        a href="/loans" { "My loans" }
                        @if user.can(Capability::ManageCatalog) {
                            a href="/add_book" { "Add book" }
                        }
                        a href="/change_password" { "Password" }
                        a href="/logout" { "Logout (" (user.name) ")" }
                    } @else {
                        a href="/login" { "Login" }
                        a href="/register" { "Register" }
                    }
                }
                @for flash in flashes {
                    div class=(flash.level.css_class()) { (flash.message) }
                }
                h1 { (title) }
                (body)
            }
        }
    }
}

fn errors_for(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @if let Some(messages) = errors.get(field) {
            @for message in messages {
                span class="error" { (message) }
            }
        }
    }
}

fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FieldErrors) -> Markup {
    html! {
        label for=(name) { (label) }
        input id=(name) name=(name) type=(kind) value=(value);
        (errors_for(errors, name))
    }
}

pub fn home(books: &[BookDetails], active_loans: i64) -> Markup {
    html! {
        p { (books.len()) " books in the catalog, " (active_loans) " on loan." }
        table {
            thead {
                tr {
                    th { "ID" }
                    th { "Title" }
                    th { "Author" }
                    th { "Category" }
                    th { "ISBN" }
                    th { "Published" }
                    th { "Status" }
                }
            }
            tbody {
                @for book in books {
                    tr {
                        td { (book.id) }
                        td { (book.title) }
                        td { (book.author) }
                        td { (book.category) }
                        td { (book.isbn) }
                        td { (book.publication_date) }
                        td { @if book.availability { "Available" } @else { "On loan" } }
                    }
                }
            }
        }
    }
}

pub fn register(form: &RegisterForm, errors: &FieldErrors) -> Markup {
    html! {
        form method="post" action="/register" {
            (input("Name", "name", "text", &form.name, errors))
            (input("Email", "email", "email", &form.email, errors))
            (input("Password", "password", "password", "", errors))
            (input("Confirm Password", "confirm_password", "password", "", errors))
            label for="role" { "Role" }
            select id="role" name="role" {
                @for role in Role::ALL {
                    option value=(role.as_str()) selected[form.role == role.as_str()] { (role.label()) }
                }
            }
            (errors_for(errors, "role"))
            p { button type="submit" { "Sign Up" } }
        }
        p { "Already have an account? " a href="/login" { "Log in" } }
    }
}

pub fn login(form: &LoginForm, errors: &FieldErrors) -> Markup {
    html! {
        form method="post" action="/login" {
            (input("Email", "email", "email", &form.email, errors))
            (input("Password", "password", "password", "", errors))
            p { button type="submit" { "Login" } }
        }
        p { "Need an account? " a href="/register" { "Sign up" } }
    }
}

pub fn add_book(form: &AddBookForm, errors: &FieldErrors) -> Markup {
    html! {
        form method="post" action="/add_book" {
            (input("Title", "title", "text", &form.title, errors))
            (input("Author", "author", "text", &form.author, errors))
            (input("Category", "category", "text", &form.category, errors))
            (input("ISBN", "isbn", "text", &form.isbn, errors))
            (input("Publication Date", "publication_date", "date", &form.publication_date, errors))
            p { button type="submit" { "Add Book" } }
        }
    }
}

/// Borrow and return share one single-field form
pub fn book_id_form(action: &str, button: &str, value: &str, errors: &FieldErrors) -> Markup {
    html! {
        form method="post" action=(action) {
            (input("Book ID", "book_id", "number", value, errors))
            p { button type="submit" { (button) } }
        }
    }
}

pub fn loans(loans: &[LoanDetails]) -> Markup {
    html! {
        @if loans.is_empty() {
            p { "You have not borrowed any books yet." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Book ID" }
                        th { "Title" }
                        th { "Borrowed" }
                        th { "Returned" }
                    }
                }
                tbody {
                    @for loan in loans {
                        tr {
                            td { (loan.book_id) }
                            td { (loan.title) }
                            td { (loan.borrow_date.format("%Y-%m-%d %H:%M")) }
                            td {
                                @match loan.return_date {
                                    Some(date) => { (date.format("%Y-%m-%d %H:%M")) }
                                    None => { strong { "On loan" } }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn change_password(errors: &FieldErrors) -> Markup {
    html! {
        form method="post" action="/change_password" {
            (input("Current Password", "current_password", "password", "", errors))
            (input("New Password", "new_password", "password", "", errors))
            (input("Confirm New Password", "confirm_password", "password", "", errors))
            p { button type="submit" { "Change Password" } }
        }
    }
}
