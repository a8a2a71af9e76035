/// Single-page upload form. Talks to `POST /api/analyze`.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Sentiment Analysis Tool</title>
<style>
  body { font-family: "Source Sans Pro", Inter, "Segoe UI", sans-serif; max-width: 760px; margin: 48px auto; padding: 0 16px; color: #262730; }
  h1 { font-size: 2.4rem; margin-bottom: 0.4rem; }
  .banner { padding: 12px 16px; border-radius: 6px; margin: 16px 0; }
  .success { background: #e8f5e9; color: #1b5e20; }
  .error { background: #ffebee; color: #b71c1c; }
  .spinner { color: #555; font-style: italic; }
  pre { white-space: pre-wrap; background: #f6f8fa; padding: 12px; border-radius: 6px; }
  [hidden] { display: none !important; }
</style>
</head>
<body>
<h1>Sentiment Analysis Tool</h1>
<p>Upload a CSV file containing reviews or comments to analyze the sentiment.</p>

<label for="file">Upload CSV</label><br>
<input id="file" type="file" name="file" accept=".csv">

<p id="spinner" class="spinner" hidden>Analyzing sentiment...</p>
<div id="success" class="banner success" hidden>Sentiment analysis completed!</div>

<section id="result" hidden>
  <h3>Sentiment Analysis Result:</h3>
  <pre id="raw"></pre>
</section>

<div id="error" class="banner error" hidden></div>

<section id="chart-section" hidden>
  <h3>Sentiment Distribution:</h3>
  <div id="chart"></div>
</section>

<script>
  const $ = (id) => document.getElementById(id);

  function reset() {
    for (const id of ["spinner", "success", "result", "error", "chart-section"]) $(id).hidden = true;
    $("raw").textContent = "";
    $("chart").innerHTML = "";
  }

  function showError(message) {
    $("error").textContent = "Error during analysis: " + message;
    $("error").hidden = false;
  }

  $("file").addEventListener("change", async (event) => {
    const file = event.target.files[0];
    reset();
    if (!file) return;

    const form = new FormData();
    form.append("file", file, file.name);
    $("spinner").hidden = false;

    try {
      const resp = await fetch("/api/analyze", { method: "POST", body: form });
      if (!resp.ok) {
        showError(await resp.text());
        return;
      }
      const outcome = await resp.json();
      if (outcome.raw_text !== null) {
        $("success").hidden = false;
        $("raw").textContent = outcome.raw_text;
        $("result").hidden = false;
      }
      if (outcome.chart_svg !== null) {
        $("chart").innerHTML = outcome.chart_svg;
        $("chart-section").hidden = false;
      }
      if (outcome.error !== null) showError(outcome.error);
    } catch (err) {
      showError(err.message);
    } finally {
      $("spinner").hidden = true;
    }
  });
</script>
</body>
</html>
"##;
