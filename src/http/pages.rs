//! Static HTML pages.

use crate::relay::Upload;

/// The upload form served at `/`.
pub const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Upload File</title>
    <link href="https://fonts.googleapis.com/css2?family=Courier+Prime:ital,wght@0,400;0,700;1,400;1,700&display=swap" rel="stylesheet">
    <style>
        body {
            font-family: 'Courier Prime', sans-serif;
            background-color: Canvas;
            color: CanvasText;
            color-scheme: light dark;
        }
    </style>
</head>
<body>
    <h1>Upload File</h1>
    <p>Max Upload Size : 10MB</p>
    <form enctype="multipart/form-data" action="/upload" method="post">
        <input type="file" name="file" required>
        <input type="submit" value="Upload">
    </form>
</body>
</html>
"#;

/// The page returned after a successful upload.
pub fn uploaded(upload: &Upload) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>File Uploaded</title>
    <link href="https://fonts.googleapis.com/css2?family=Courier+Prime:ital,wght@0,400;0,700;1,400;1,700&display=swap" rel="stylesheet">
    <style>
        body {{
            font-family: 'Courier Prime', sans-serif;
            background-color: Canvas;
            color: CanvasText;
            color-scheme: light dark;
        }}
    </style>
</head>
<body>
    <h1>File Uploaded Successfully</h1>
    <p>Your file has been uploaded and renamed to <strong>{name}</strong>.</p>
    <p>File links are only valid for 1 hour.</p>
    <p><a href="{link}">Download</a></p>
</body>
</html>
"#,
        name = escape(&upload.file_name),
        link = escape(&upload.download_link),
    )
}

/// Escapes text for use in HTML content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
