//! HTML page rendering
//!
//! Plain server-rendered forms; styling and client-side behavior are out
//! of scope. Every dynamic value passes through `esc`.

use std::collections::HashSet;

use firequote_core::intake::MAX_NOTES;
use firequote_core::models::{BuildingType, Client, ClientTitle, Norm, Quote, TimeUnit};

use super::Flash;

/// Escape text for HTML element and attribute positions.
fn esc(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn flash_block(flash: &Flash) -> String {
    let mut block = String::new();
    if let Some(error) = &flash.error {
        block.push_str(&format!("<p class=\"error\">{}</p>\n", esc(error)));
    }
    if let Some(notice) = &flash.notice {
        block.push_str(&format!("<p class=\"notice\">{}</p>\n", esc(notice)));
    }
    block
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        esc(title),
        body
    )
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

fn selected(on: bool) -> &'static str {
    if on {
        " selected"
    } else {
        ""
    }
}

fn title_options(current: Option<ClientTitle>) -> String {
    let mut options = String::from("<option value=\"\"></option>");
    for title in [
        ClientTitle::Ingeniero,
        ClientTitle::Arquitecto,
        ClientTitle::Senior,
    ] {
        options.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            title.key(),
            selected(current == Some(title)),
            title.display()
        ));
    }
    options
}

fn time_unit_options(current: TimeUnit) -> String {
    [TimeUnit::Days, TimeUnit::Weeks, TimeUnit::Months]
        .iter()
        .map(|unit| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                unit.key(),
                selected(*unit == current),
                unit.display()
            )
        })
        .collect()
}

/// The quote-creation form.
pub fn quote_form(clients: &[Client], flash: &Flash) -> String {
    let client_options: String = clients
        .iter()
        .map(|c| {
            format!(
                "<option value=\"{}\">{} — {}</option>",
                c.id,
                esc(&c.full_name),
                esc(&c.company)
            )
        })
        .collect();

    let body = format!(
        r#"{flash}<h1>Nueva cotización</h1>
<form method="post" action="/">
  <fieldset>
    <legend>Cliente existente</legend>
    <select name="existing_client"><option value=""></option>{client_options}</select>
  </fieldset>
  <fieldset>
    <legend>Cliente nuevo</legend>
    <label>Título <select name="new_client_title">{titles}</select></label>
    <label>Nombre <input name="new_client_name"></label>
    <label>Cargo <input name="new_client_position"></label>
    <label>Empresa <input name="new_client_company"></label>
    <label>Ciudad <input name="new_client_city"></label>
    <label>Correo <input name="new_client_email"></label>
    <label>Teléfono <input name="new_client_phone"></label>
  </fieldset>
  <label>Nombre del proyecto <input name="project_name" required></label>
  <fieldset>
    <legend>Servicios</legend>
    <label><input type="checkbox" name="is_detection" value="on"> Detección de incendios</label>
    <label><input type="checkbox" name="is_protection" value="on"> Protección contra incendios</label>
    <label><input type="checkbox" name="is_human_safety" value="on"> Seguridad humana</label>
  </fieldset>
  <fieldset>
    <legend>Formatos de entrega</legend>
    <label><input type="checkbox" name="deliver_autocad" value="on"> AutoCAD</label>
    <label><input type="checkbox" name="deliver_revit" value="on"> Revit</label>
  </fieldset>
  <label>Tiempo de entrega <input name="delivery_time_value" value="0"></label>
  <select name="delivery_time_unit">{units}</select>
  <button type="submit">Crear cotización</button>
</form>
"#,
        flash = flash_block(flash),
        client_options = client_options,
        titles = title_options(None),
        units = time_unit_options(TimeUnit::Days),
    );

    page("Nueva cotización", &body)
}

/// The quote detail page: current values, norm checkboxes, note slots, and
/// the generate button.
pub fn quote_details(
    quote: &Quote,
    client: &Client,
    norms: &[Norm],
    selected_norm_ids: &HashSet<i64>,
    default_norm_ids: &HashSet<i64>,
    flash: &Flash,
) -> String {
    let norm_rows: String = norms
        .iter()
        .map(|n| {
            // With no explicit selection yet, the default set starts ticked.
            let ticked = selected_norm_ids.contains(&n.id)
                || (selected_norm_ids.is_empty() && default_norm_ids.contains(&n.id));
            format!(
                "<label><input type=\"checkbox\" name=\"selected_norms\" value=\"{}\"{}> {} {}</label><br>\n",
                n.id,
                checked(ticked),
                esc(&n.code),
                esc(&n.description)
            )
        })
        .collect();

    let note_rows: String = (1..=MAX_NOTES)
        .map(|i| format!("<input name=\"note_{i}\"><br>\n"))
        .collect();

    let building_options: String = {
        let mut options = String::from("<option value=\"\"></option>");
        for building in [BuildingType::Residential, BuildingType::Commercial] {
            options.push_str(&format!(
                "<option value=\"{}\"{}>{}</option>",
                building.key(),
                selected(quote.building_type == Some(building)),
                building.display()
            ));
        }
        options
    };

    let body = format!(
        r#"{flash}<h1>Cotización {number} — {project}</h1>
<p>{client_name} — {client_company}</p>
<form method="post" action="/quote/{id}">
  <fieldset>
    <legend>Servicios</legend>
    <label><input type="checkbox" name="is_detection" value="on"{det}> Detección de incendios</label>
    <label><input type="checkbox" name="is_protection" value="on"{prot}> Protección contra incendios</label>
    <label><input type="checkbox" name="is_human_safety" value="on"{sh}> Seguridad humana</label>
  </fieldset>
  <fieldset>
    <legend>Formatos de entrega</legend>
    <label><input type="checkbox" name="deliver_autocad" value="on"{autocad}> AutoCAD</label>
    <label><input type="checkbox" name="deliver_revit" value="on"{revit}> Revit</label>
  </fieldset>
  <label>Tipo de edificación <select name="building_type">{buildings}</select></label>
  <label>Área (m²) <input name="area_sqm" value="{area}"></label>
  <fieldset>
    <legend>Requerimientos del cliente</legend>
    <textarea name="manual_requirements">{requirements}</textarea>
  </fieldset>
  <fieldset>
    <legend>Ítems — seguridad humana</legend>
    <textarea name="manual_items_sh">{items_sh}</textarea>
  </fieldset>
  <fieldset>
    <legend>Ítems — detección</legend>
    <textarea name="manual_items_detection">{items_detection}</textarea>
  </fieldset>
  <fieldset>
    <legend>Ítems — protección</legend>
    <textarea name="manual_items_protection">{items_protection}</textarea>
  </fieldset>
  <fieldset>
    <legend>Normas de referencia</legend>
{norm_rows}  </fieldset>
  <fieldset>
    <legend>Notas adicionales</legend>
    <input type="hidden" name="notes_count" value="{notes_count}">
{note_rows}  </fieldset>
  <fieldset>
    <legend>Forma de pago (%)</legend>
    <label>Anticipo <input name="payment_advance" value="{advance}"></label>
    <label>Primera versión <input name="payment_first_version" value="{first}"></label>
    <label>Entrega final <input name="payment_final" value="{fin}"></label>
  </fieldset>
  <label>Tiempo de entrega <input name="delivery_time_value" value="{delivery_value}"></label>
  <select name="delivery_time_unit">{units}</select>
  <fieldset>
    <legend>Valores</legend>
    <label>Detección <input name="value_detection" value="{v_det}"></label>
    <label>Protección <input name="value_protection" value="{v_prot}"></label>
    <label>Seguridad humana <input name="value_human_safety" value="{v_sh}"></label>
    <label>Total <input name="total_value" value="{v_total}"></label>
  </fieldset>
  <button type="submit">Generar documento</button>
</form>
"#,
        flash = flash_block(flash),
        number = esc(&quote.number()),
        project = esc(&quote.project_name),
        client_name = esc(&client.full_name),
        client_company = esc(&client.company),
        id = quote.id,
        det = checked(quote.is_detection),
        prot = checked(quote.is_protection),
        sh = checked(quote.is_human_safety),
        autocad = checked(quote.deliver_autocad),
        revit = checked(quote.deliver_revit),
        buildings = building_options,
        area = quote
            .area_sqm
            .map(|a| a.to_string())
            .unwrap_or_default(),
        requirements = esc(&quote.manual_requirements),
        items_sh = esc(&quote.manual_items_sh),
        items_detection = esc(&quote.manual_items_detection),
        items_protection = esc(&quote.manual_items_protection),
        norm_rows = norm_rows,
        notes_count = MAX_NOTES,
        note_rows = note_rows,
        advance = quote.payment_advance,
        first = quote.payment_first_version,
        fin = quote.payment_final,
        delivery_value = quote.delivery_time_value,
        units = time_unit_options(quote.delivery_time_unit),
        v_det = quote.value_detection,
        v_prot = quote.value_protection,
        v_sh = quote.value_human_safety,
        v_total = quote.total_value,
    );

    page(&format!("Cotización {}", quote.number()), &body)
}
