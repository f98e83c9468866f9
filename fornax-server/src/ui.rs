use fornax_core::{Accelerator, DEFAULT_GUIDANCE, DEFAULT_SEED};

/// Example prompts shown under the form; clicking one fills the prompt box.
const EXAMPLE_PROMPTS: [&str; 5] = [
    "a futuristic city at sunset, cyberpunk style",
    "a serene mountain landscape with a lake, photorealistic",
    "a cute robot reading a book, digital art",
    "an abstract painting with vibrant colors",
    "a steampunk airship flying through clouds",
];

const PAGE: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Fornax Image Generator</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; padding: 0 1rem; color: #222; }
  h1 { margin-bottom: 0.25rem; }
  .banner { color: #555; margin-bottom: 1.5rem; }
  .columns { display: flex; gap: 2rem; flex-wrap: wrap; }
  .column { flex: 1; min-width: 20rem; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  textarea, input { width: 100%; box-sizing: border-box; }
  textarea { resize: vertical; }
  output { font-weight: 400; margin-left: 0.5rem; }
  button { margin-top: 1.25rem; padding: 0.6rem 1.5rem; font-size: 1rem; cursor: pointer; }
  .examples button { margin: 0.25rem 0.25rem 0 0; padding: 0.3rem 0.6rem; font-size: 0.85rem; }
  .result img { max-width: 100%; margin-top: 1rem; }
  .error { display: none; margin-top: 1rem; padding: 0.75rem; border: 1px solid #c00; color: #c00; white-space: pre-wrap; }
  .tips { color: #555; font-size: 0.9rem; }
</style>
</head>
<body>
<h1>Fornax Image Generator</h1>
<p class="banner">
  Fast image generation with a pretrained diffusion pipeline.<br>
  <strong>Device:</strong> <code>{{device}}</code> |
  <strong>Precision:</strong> <code>{{dtype}}</code><br>
  {{device_note}}
</p>

<div class="columns">
  <div class="column">
    <label for="prompt">Prompt</label>
    <textarea id="prompt" rows="3" placeholder="a futuristic city at sunset, cyberpunk style"></textarea>

    <label for="width">Width<output id="width-value">{{size_default}}</output></label>
    <input type="range" id="width" min="256" max="{{size_max}}" step="64" value="{{size_default}}">

    <label for="height">Height<output id="height-value">{{size_default}}</output></label>
    <input type="range" id="height" min="256" max="{{size_max}}" step="64" value="{{size_default}}">

    <label for="steps">Inference Steps<output id="steps-value">{{steps_default}}</output></label>
    <input type="range" id="steps" min="5" max="{{steps_max}}" step="1" value="{{steps_default}}">

    <label for="guidance">Guidance Scale<output id="guidance-value">{{guidance_default}}</output></label>
    <input type="range" id="guidance" min="1.0" max="10.0" step="0.5" value="{{guidance_default}}">

    <label for="seed">Seed</label>
    <input type="number" id="seed" step="1" value="{{seed_default}}">

    <button id="generate">Generate</button>

    <div class="examples">
      <p><strong>Examples</strong></p>
      {{examples}}
    </div>
  </div>

  <div class="column result">
    <p><strong>Generated Image</strong></p>
    <div id="error" class="error"></div>
    <img id="output" alt="">
  </div>
</div>

<div class="tips">
  <p><strong>Tips</strong></p>
  <ul>
    <li>Higher inference steps = better quality but slower generation</li>
    <li>Guidance scale controls how closely the image follows the prompt</li>
    <li>Change the seed for different variations</li>
    {{cpu_tip}}
  </ul>
</div>

<script>
  const el = (id) => document.getElementById(id);
  for (const name of ['width', 'height', 'steps', 'guidance']) {
    el(name).addEventListener('input', () => {
      el(name + '-value').textContent = el(name).value;
    });
  }
  for (const button of document.querySelectorAll('.examples button')) {
    button.addEventListener('click', () => {
      el('prompt').value = button.textContent;
    });
  }
  el('generate').addEventListener('click', async () => {
    const button = el('generate');
    const error = el('error');
    const output = el('output');
    button.disabled = true;
    button.textContent = 'Generating...';
    error.style.display = 'none';
    try {
      const response = await fetch('/v1/images/generations', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({
          prompt: el('prompt').value,
          steps: Number(el('steps').value),
          guidance: Number(el('guidance').value),
          seed: el('seed').value === '' ? null : el('seed').value,
          width: Number(el('width').value),
          height: Number(el('height').value),
        }),
      });
      const reply = await response.json();
      if (reply.image) {
        output.src = 'data:image/png;base64,' + reply.image;
      } else {
        error.textContent = reply.error || 'Error generating image: unexpected response';
        error.style.display = 'block';
      }
    } catch (err) {
      error.textContent = 'Error generating image: ' + err;
      error.style.display = 'block';
    } finally {
      button.disabled = false;
      button.textContent = 'Generate';
    }
  });
</script>
</body>
</html>
"##;

/// Renders the demo page for the detected accelerator. Slider ranges and
/// defaults shrink on CPU, where big resolutions and step counts are
/// impractical.
pub fn render_page(accel: Accelerator) -> String {
    let cpu = accel.is_cpu();
    let device_note = if cpu {
        "&#9888; Running on CPU &mdash; generation will be slower. Consider 512x512 resolution."
    } else {
        "&#9989; GPU acceleration enabled"
    };
    let cpu_tip = if cpu {
        "<li><strong>CPU mode:</strong> use smaller resolutions (512x512) and fewer steps (10-15) for faster generation</li>"
    } else {
        ""
    };
    let examples = EXAMPLE_PROMPTS
        .iter()
        .map(|prompt| format!("<button type=\"button\">{prompt}</button>"))
        .collect::<Vec<_>>()
        .join("\n      ");

    PAGE.replace("{{device}}", &accel.to_string())
        .replace(
            "{{dtype}}",
            &format!("{:?}", accel.dtype()).to_lowercase(),
        )
        .replace("{{device_note}}", device_note)
        .replace("{{size_max}}", if cpu { "1024" } else { "2048" })
        .replace("{{size_default}}", if cpu { "512" } else { "1024" })
        .replace("{{steps_max}}", if cpu { "30" } else { "50" })
        .replace("{{steps_default}}", if cpu { "10" } else { "20" })
        .replace("{{guidance_default}}", &DEFAULT_GUIDANCE.to_string())
        .replace("{{seed_default}}", &DEFAULT_SEED.to_string())
        .replace("{{cpu_tip}}", cpu_tip)
        .replace("{{examples}}", &examples)
}
