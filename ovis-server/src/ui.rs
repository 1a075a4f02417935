//! Embedded upload form

use axum::response::Html;

/// The whole UI is one static page: a form posting multipart data to
/// the process endpoint, a message box, and a video element for the
/// result.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Object Tracking &amp; Segmentation</title>
    <style>
        body { font-family: sans-serif; max-width: 680px; margin: 2rem auto; padding: 0 1rem; }
        fieldset { border: 1px solid #ccc; border-radius: 6px; margin-bottom: 1rem; }
        label { display: block; margin: 0.5rem 0; }
        #message { color: #b00020; min-height: 1.5rem; margin: 1rem 0; }
        #result { width: 100%; display: none; }
        button { padding: 0.5rem 1.5rem; }
    </style>
</head>
<body>
    <h1>Object Tracking &amp; Segmentation</h1>
    <p>Upload a video, select tracking or segmentation, and enter object classes to process the video.</p>
    <form id="form">
        <fieldset>
            <label>Upload Video
                <input type="file" name="video" accept="video/*" required>
            </label>
            <label>Choose Mode</label>
            <label><input type="radio" name="mode" value="Track" checked> Track</label>
            <label><input type="radio" name="mode" value="Segment"> Segment</label>
            <label>Enter Object Classes (comma-separated)
                <input type="text" name="classes" placeholder="e.g., ball, car, person">
            </label>
        </fieldset>
        <button type="submit">Process</button>
    </form>
    <div id="message"></div>
    <video id="result" controls autoplay></video>
    <script>
        const form = document.getElementById('form');
        const message = document.getElementById('message');
        const result = document.getElementById('result');
        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            message.textContent = 'Processing… this can take a while.';
            result.style.display = 'none';
            try {
                const response = await fetch('/api/v1/process', {
                    method: 'POST',
                    body: new FormData(form),
                });
                const body = await response.json();
                if (!response.ok) {
                    message.textContent = body.error || 'Request failed.';
                    return;
                }
                if (body.message) {
                    message.textContent = body.message;
                } else if (body.video_url) {
                    message.textContent = '';
                    result.src = body.video_url;
                    result.style.display = 'block';
                } else {
                    message.textContent = 'Processing failed. No result returned.';
                }
            } catch (err) {
                message.textContent = 'Request failed: ' + err;
            }
        });
    </script>
</body>
</html>
"#;

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
