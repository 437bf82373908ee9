use super::{AGENCY, CALL_CENTER, CALL_CENTER_NOTE, EVACUEE_PAGE};
use crate::records::{self, MISSING_PLACEHOLDER};
use crate::runner::{ViewOutput, ViewRows, EMPTY_STATE_HINT, EMPTY_STATE_TITLE};
use crate::utils::escape_html;

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn td(value: &str) -> String {
    format!(
        "<td class=\"px-4 py-3\">{}</td>",
        escape_html(records::or_placeholder(value))
    )
}

fn table(header: &[&str], body: &str) -> String {
    let head = header
        .iter()
        .map(|h| format!("<th class=\"px-4 py-3 text-left\">{}</th>", escape_html(h)))
        .collect::<String>();
    format!(
        r#"<div class="overflow-x-auto rounded-xl border border-slate-200 bg-white">
        <table class="w-full text-sm">
          <thead class="bg-orange-600 text-white"><tr>{head}</tr></thead>
          <tbody class="divide-y divide-slate-100">{body}</tbody>
        </table>
      </div>"#
    )
}

fn render_rows(rows: &ViewRows) -> String {
    match rows {
        ViewRows::Evacuees(rows) => {
            let body = rows
                .iter()
                .map(|r| {
                    format!(
                        "<tr>{}{}{}</tr>",
                        td(&r.number.to_string()),
                        td(&r.record.name),
                        td(r.record.location_or_placeholder())
                    )
                })
                .collect::<String>();
            table(&["No", "Nama", "Lokasi"], &body)
        }
        ViewRows::Deceased(rows) => {
            let body = rows
                .iter()
                .map(|r| {
                    let no = if r.record.no.is_empty() {
                        r.number.to_string()
                    } else {
                        r.record.no.clone()
                    };
                    format!(
                        "<tr>{}{}{}{}{}</tr>",
                        td(&no),
                        td(&r.record.name),
                        td(&r.record.age),
                        td(&r.record.address),
                        td(r.record.description.as_deref().unwrap_or_default())
                    )
                })
                .collect::<String>();
            table(&["No", "Nama", "Umur", "Alamat", "Keterangan"], &body)
        }
        ViewRows::Helipads(rows) => {
            let body = rows
                .iter()
                .map(|r| {
                    let h = &r.record.record;
                    let link = match r.record.map_link.as_deref() {
                        Some(url) => format!(
                            "<td class=\"px-4 py-3\"><a class=\"text-orange-600 underline\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Lihat Peta</a></td>",
                            escape_html(url)
                        ),
                        None => td(MISSING_PLACEHOLDER),
                    };
                    format!(
                        "<tr>{}{}{}{}{}{}{}</tr>",
                        td(&r.number.to_string()),
                        td(&h.district),
                        td(&h.village),
                        td(&h.latitude),
                        td(&h.longitude),
                        td(&h.remarks),
                        link
                    )
                })
                .collect::<String>();
            table(
                &["No", "Kecamatan", "Desa", "Lintang", "Bujur", "Keterangan", "Peta"],
                &body,
            )
        }
        ViewRows::Posko(posko) => {
            let mut out = String::new();
            for group in &posko.groups {
                let body = group
                    .entries
                    .iter()
                    .map(|e| {
                        let headcount = if e.clickable {
                            format!(
                                "<td class=\"px-4 py-3\"><a class=\"font-semibold text-orange-600 underline\" href=\"{}\">{}</a></td>",
                                EVACUEE_PAGE,
                                escape_html(&e.entry.headcount)
                            )
                        } else {
                            td(&e.entry.headcount)
                        };
                        format!(
                            "<tr>{}{}{}</tr>",
                            td(&e.entry.no.to_string()),
                            td(&e.entry.name),
                            headcount
                        )
                    })
                    .collect::<String>();
                let open = if group.open { " open" } else { "" };
                out.push_str(&format!(
                    r#"<details class="mb-4"{open}>
        <summary class="cursor-pointer font-bold text-lg mb-2">{district} <span class="text-slate-500 text-sm">({count} posko)</span></summary>
        {table}
      </details>"#,
                    district = escape_html(&group.district),
                    count = group.entries.len(),
                    table = table(&["No", "Nama Posko", "Jumlah"], &body),
                ));
            }
            out.push_str(&format!(
                r#"<div class="mt-6 rounded-xl bg-orange-50 border border-orange-200 px-6 py-4 text-lg font-bold">Total: {}</div>"#,
                escape_html(&posko.total_text)
            ));
            out
        }
    }
}

fn render_empty_state() -> String {
    format!(
        r#"<div class="rounded-xl border border-dashed border-slate-300 bg-white px-6 py-12 text-center">
        <p class="text-lg font-semibold">{}</p>
        <p class="text-slate-500">{}</p>
      </div>"#,
        escape_html(EMPTY_STATE_TITLE),
        escape_html(EMPTY_STATE_HINT)
    )
}

fn render_pagination(out: &ViewOutput) -> String {
    let Some(page) = &out.pagination else {
        return String::new();
    };
    let prev = if page.has_prev { "" } else { " opacity-40" };
    let next = if page.has_next { "" } else { " opacity-40" };
    format!(
        r#"<nav class="mt-6 flex flex-col md:flex-row items-center justify-between gap-3 text-sm">
        <span>{range}</span>
        <div class="flex items-center gap-3">
          <span class="rounded-lg border px-3 py-1{prev}">Sebelumnya</span>
          <span>{page_text}</span>
          <span class="rounded-lg border px-3 py-1{next}">Selanjutnya</span>
        </div>
      </nav>"#,
        range = escape_html(&page.range_text),
        page_text = escape_html(&page.page_text),
    )
}

/// Self-contained page for one view. The rendered view is also embedded as
/// JSON for anything that wants to script against it.
pub fn render_html(out: &ViewOutput) -> Vec<u8> {
    let json = serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);

    let body = if out.rows.is_empty() {
        render_empty_state()
    } else {
        render_rows(&out.rows)
    };
    let category = match out.category_label {
        Some(label) => {
            let options = out
                .category_options
                .iter()
                .map(|o| format!("<li>{}</li>", escape_html(o)))
                .collect::<String>();
            format!(
                r#"<details class="text-sm text-slate-600"><summary>{}</summary><ul class="list-disc ml-6">{options}</ul></details>"#,
                escape_html(label)
            )
        }
        None => String::new(),
    };

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="id">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title} - {agency}</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <style>
    body {{
      font-family: 'Inter', sans-serif;
    }}
  </style>
</head>
<body class="bg-slate-50 text-slate-900 min-h-screen">
  <script type="application/json" id="view-data">{json}</script>
  <header class="bg-orange-600 text-white px-8 py-4">
    <p class="text-sm uppercase tracking-wide">{agency}</p>
    <h1 class="text-3xl font-bold">{title}</h1>
    <p class="text-sm opacity-90">Update terakhir: {last_update}</p>
  </header>

  <main class="max-w-[1200px] mx-auto w-full px-8 py-8">
    <div class="mb-6 flex flex-col gap-2">
      <p class="text-slate-600">{summary}</p>
      {category}
    </div>
    {body}
    {pagination}
  </main>

  <footer class="border-t border-slate-200 bg-white px-8 py-6 text-center text-sm">
    <p class="font-semibold">Call Center: {call_center}</p>
    <p class="text-slate-500">{call_center_note}</p>
    <p class="text-slate-400 mt-2">&copy; {agency}</p>
  </footer>
</body>
</html>"####,
        title = escape_html(out.title),
        agency = escape_html(AGENCY),
        last_update = escape_html(out.last_update.display()),
        summary = escape_html(&out.summary_text),
        pagination = render_pagination(out),
        call_center = CALL_CENTER,
        call_center_note = escape_html(CALL_CENTER_NOTE),
    );

    html.into_bytes()
}
