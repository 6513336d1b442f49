// HTML for the demo pages
use html_escape::encode_text;

use super::{HELLO_PATH, LOGOUT_PATH};

const STYLES: &str = r"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #f3f2f1;
            margin: 0;
            padding: 40px 0;
        }
        .container {
            background: white;
            padding: 32px 40px;
            border-radius: 8px;
            box-shadow: 0 8px 24px rgba(0, 0, 0, 0.08);
            max-width: 720px;
            margin: 0 auto;
        }
        h1 { color: #0078d4; }
        table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
        th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #edebe9; }
        td { word-break: break-all; }
        form { margin: 24px 0; }
        input[type=text] { padding: 8px; width: 60%; }
        button {
            padding: 8px 16px;
            background: #0078d4;
            color: white;
            border: 0;
            border-radius: 4px;
        }
        .footer { margin-top: 24px; color: #605e5c; }
";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="icon" href="/favicon.ico">
    <style>{STYLES}</style>
</head>
<body>
    <div class="container">
{body}
        <div class="footer">
            <a href="{LOGOUT_PATH}">Sign out</a>
        </div>
    </div>
</body>
</html>"#,
        title = encode_text(title),
    )
}

/// Index page: greeting form plus the request's header table
#[must_use]
pub fn render_index_page(display_name: &str, headers: &[(String, String)]) -> String {
    let rows = headers
        .iter()
        .map(|(name, value)| {
            format!(
                "                <tr><th>{}</th><td>{}</td></tr>",
                encode_text(name),
                encode_text(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"        <h1>Welcome to Azure</h1>
        <p>Signed in as <strong>{user}</strong></p>
        <form method="post" action="{HELLO_PATH}">
            <label for="name">Could you please tell me your name?</label><br>
            <input type="text" id="name" name="name">
            <button type="submit">Submit</button>
        </form>
        <h2>Request headers</h2>
        <table>
{rows}
        </table>"#,
        user = encode_text(display_name),
    );

    layout("Hello Azure", &body)
}

/// Greeting page for the posted name
#[must_use]
pub fn render_hello_page(name: &str) -> String {
    let body = format!(
        r#"        <h1>Hello {name}</h1>
        <p>It is nice to meet you!</p>
        <a href="/">Back home</a>"#,
        name = encode_text(name),
    );

    layout("Hello Azure", &body)
}
