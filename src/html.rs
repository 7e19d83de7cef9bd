//! Static HTML rendering of the table.
//!
//! Produces the markup of the browser widget: BEM class names on every
//! element and `data-*` attributes carrying the payloads that delegated click
//! handlers read (`data-id`, `data-type`, `data-col`, `data-page-number`).

use std::fmt::Write;

use crate::domain::Locale;
use crate::form::FormPhase;
use crate::pagination::{PageTarget, PageWindow};
use crate::render::{BodyRow, CellContent, FooterCell, FormView, HeaderCell, RenderTarget};

const TABLE: &str = "main__table-container__table";
const PAGINATION: &str = "main__pagination-container";
const FORM_WRAPPER: &str = "main__form-container__form-wrapper";
const HIDDEN_COLUMN: &str = "hidden-column";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn class_list(base: &str, extra: &[(&str, bool)]) -> String {
    let mut classes = base.to_string();
    for (class, on) in extra {
        if *on {
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }
    classes
}

/// ` class="..."`, or nothing at all for an empty list.
fn class_attr(classes: &str) -> String {
    if classes.is_empty() {
        String::new()
    } else {
        format!(" class=\"{classes}\"")
    }
}

/// Collects rendered fragments as markup.
#[derive(Debug, Default)]
pub struct HtmlDocument {
    locale: Locale,
    header: String,
    body: String,
    footer: String,
    pagination: String,
    form: String,
    alerts: Vec<String>,
}

impl HtmlDocument {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Default::default()
        }
    }

    /// The whole widget as one page.
    pub fn to_document(&self) -> String {
        let alerts: String = self
            .alerts
            .iter()
            .map(|a| format!("<div class=\"alert\" role=\"alert\">{}</div>\n", escape(a)))
            .collect();
        format!(
            "<!DOCTYPE html>\n\
             <html><head><meta charset=\"utf-8\"></head><body>\n\
             <main class=\"main\">\n\
             <div class=\"main__table-container\">\n\
             <table class=\"{TABLE}\">\n\
             <thead class=\"{TABLE}__header\">{header}</thead>\n\
             <tbody class=\"{TABLE}__body\">{body}</tbody>\n\
             <tfoot class=\"{TABLE}__footer\">{footer}</tfoot>\n\
             </table>\n\
             </div>\n\
             {pagination}\n\
             {form}\n\
             {alerts}\
             </main>\n\
             </body></html>\n",
            header = self.header,
            body = self.body,
            footer = self.footer,
            pagination = self.pagination,
            form = self.form,
        )
    }

    fn arrow(&self, out: &mut String, target: &PageTarget, icon: &str, title: &str) {
        let page = target.page.map(|p| p.to_string()).unwrap_or_default();
        let classes = class_list(
            &format!("{PAGINATION}__number pagination-arrow"),
            &[("pagination-disabled", target.disabled)],
        );
        let title = if target.disabled { "" } else { title };
        let _ = write!(
            out,
            "<div class=\"{classes}\" data-page-number=\"{page}\" title=\"{}\">\
             <svg width=\"18\" height=\"18\"><use xlink:href=\"#{icon}\" /></svg></div>",
            escape(title)
        );
    }
}

impl RenderTarget for HtmlDocument {
    fn render_header(&mut self, cells: &[HeaderCell]) {
        let mut out = format!("<tr class=\"{TABLE}__header__row\">");
        for cell in cells {
            let sorted = cell.sort.map(|d| format!("sorted-{}", d.as_str()));
            let arrow = class_list(
                "sort-arrow",
                &[
                    (sorted.as_deref().unwrap_or_default(), sorted.is_some()),
                    (HIDDEN_COLUMN, cell.hidden),
                ],
            );
            let text = class_list(
                &format!("{TABLE}__header__row__col__text"),
                &[("table-header-active", cell.sort.is_some())],
            );
            let wrapper = class_list("", &[(HIDDEN_COLUMN, cell.hidden)]);
            let _ = write!(
                out,
                "<th class=\"{TABLE}__header__row__col\" data-type=\"{}\">\
                 <div{}><span class=\"{text}\">{}</span>\
                 <img src=\"img/arrow-down-sign-to-navigate.png\" class=\"{arrow}\"></div></th>",
                cell.field.id(),
                class_attr(&wrapper),
                escape(cell.label),
            );
        }
        out.push_str("</tr>");
        self.header = out;
    }

    fn render_body(&mut self, rows: &[BodyRow]) {
        let mut out = String::new();
        for row in rows {
            let _ = write!(
                out,
                "<tr class=\"{TABLE}__body__row\" data-id=\"{}\">",
                escape(&row.id)
            );
            for cell in row.cells.iter() {
                let td = class_list(
                    &format!("{TABLE}__body__row__col"),
                    &[(HIDDEN_COLUMN, cell.hidden)],
                );
                let field = cell.field.id();
                let _ = write!(out, "<td class=\"{td}\" data-type=\"{field}\">");
                match &cell.content {
                    CellContent::Text(text) => {
                        let div = class_list("", &[(HIDDEN_COLUMN, cell.hidden)]);
                        let _ = write!(out, "<div{}>{}</div>", class_attr(&div), escape(text));
                    }
                    CellContent::Swatch(color) => {
                        let div = class_list("color-container", &[(HIDDEN_COLUMN, cell.hidden)]);
                        let ray = class_list(
                            "color-container__color-ray",
                            &[(HIDDEN_COLUMN, cell.hidden)],
                        );
                        let _ = write!(
                            out,
                            "<div class=\"{div}\">\
                             <div class=\"{ray}\" data-color=\"{}\"></div></div>",
                            color.as_str()
                        );
                    }
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        self.body = out;
    }

    fn render_footer(&mut self, cells: &[FooterCell]) {
        let mut out = format!("<tr class=\"{TABLE}__footer__row\">");
        for cell in cells {
            let classes = class_list(
                &format!("{TABLE}__footer__row__col"),
                &[("footer-hidden", cell.hidden)],
            );
            let _ = write!(
                out,
                "<td class=\"{classes}\" data-col=\"{}\">{}</td>",
                cell.column,
                escape(cell.caption)
            );
        }
        out.push_str("</tr>");
        self.footer = out;
    }

    fn render_pagination(&mut self, window: Option<&PageWindow>) {
        let Some(window) = window else {
            self.pagination = format!("<div class=\"{PAGINATION} hidden\"></div>");
            return;
        };
        let mut out = format!("<div class=\"{PAGINATION}\">");
        self.arrow(
            &mut out,
            &window.previous,
            "left",
            self.locale.previous_title(),
        );
        for link in window.pages.iter() {
            let classes = class_list(
                &format!("{PAGINATION}__number"),
                &[("pagination-current", link.active)],
            );
            let title = if link.active {
                String::new()
            } else {
                self.locale.page_title(link.number)
            };
            let _ = write!(
                out,
                "<div class=\"{classes}\" data-page-number=\"{n}\" title=\"{}\">{n}</div>",
                escape(&title),
                n = link.number
            );
        }
        self.arrow(&mut out, &window.next, "right", self.locale.next_title());
        out.push_str("</div>");
        self.pagination = out;
    }

    fn render_form(&mut self, form: &FormView) {
        let container = class_list(
            "main__form-container",
            &[
                ("opacity-none", form.phase != FormPhase::Visible),
                ("hidden", form.phase == FormPhase::Hidden),
                ("display-none", form.phase == FormPhase::Hidden),
            ],
        );
        let mut out = format!("<div class=\"{container}\"><div class=\"{FORM_WRAPPER}\">");
        let _ = write!(
            out,
            "<div class=\"{FORM_WRAPPER}__header\">\
             <button type=\"button\" class=\"{FORM_WRAPPER}__header__btn-close\">&times;</button>\
             </div>"
        );
        let _ = write!(
            out,
            "<form id=\"edit-form\" class=\"{FORM_WRAPPER}__form\" data-id=\"{}\">",
            escape(form.record_id.as_deref().unwrap_or_default())
        );
        for input in form.inputs.iter() {
            let id = format!("form-{}", input.field.id().to_ascii_lowercase());
            let _ = write!(
                out,
                "<label for=\"{id}\">{}</label><input id=\"{id}\" value=\"{}\"{}>",
                escape(input.label),
                escape(&input.value),
                if input.focused { " autofocus" } else { "" }
            );
        }
        let _ = write!(
            out,
            "<button type=\"submit\" class=\"{FORM_WRAPPER}__form__btn-save\">Save</button>\
             </form></div></div>"
        );
        self.form = out;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
