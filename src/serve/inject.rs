// src/serve/inject.rs

//! Live-reload client injection into served HTML.

/// Client script template; `__WS_PORT__` is substituted at serve time.
///
/// The client swaps stylesheets in place on `css` messages (cache-busting
/// the href), fully reloads on `reload`, and renders a fixed-position
/// overlay for `error` until a `clear_error` arrives.
const HOTRELOAD_JS: &str = r#"<script>
(function () {
  var OVERLAY_ID = "__assetpipe_error_overlay";

  function showOverlay(task, message) {
    hideOverlay();
    var el = document.createElement("div");
    el.id = OVERLAY_ID;
    el.style.cssText =
      "position:fixed;inset:0;z-index:2147483647;background:rgba(20,20,20,0.92);" +
      "color:#ff8080;font:14px/1.5 monospace;padding:2rem;white-space:pre-wrap;overflow:auto";
    el.textContent = "[" + task + "] " + message;
    document.body.appendChild(el);
  }

  function hideOverlay() {
    var el = document.getElementById(OVERLAY_ID);
    if (el) el.remove();
  }

  function swapStylesheets() {
    var links = document.querySelectorAll("link[rel='stylesheet']");
    for (var i = 0; i < links.length; i++) {
      var href = links[i].getAttribute("href").split("?")[0];
      links[i].setAttribute("href", href + "?t=" + Date.now());
    }
  }

  function connect() {
    var ws = new WebSocket("ws://" + location.hostname + ":__WS_PORT__");
    ws.onmessage = function (event) {
      var msg;
      try {
        msg = JSON.parse(event.data);
      } catch (e) {
        return;
      }
      if (msg.type === "reload") location.reload();
      else if (msg.type === "css") swapStylesheets();
      else if (msg.type === "error") showOverlay(msg.task, msg.message);
      else if (msg.type === "clear_error") hideOverlay();
    };
    ws.onclose = function () {
      setTimeout(connect, 1000);
    };
  }

  connect();
})();
</script>"#;

/// Inject the reload client before `</body>`, or append it when the tag is
/// absent (browsers handle trailing scripts gracefully).
pub fn inject_hotreload(body: Vec<u8>, ws_port: u16) -> Vec<u8> {
    let script = HOTRELOAD_JS.replace("__WS_PORT__", &ws_port.to_string());
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    if let Some(pos) = body
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(body.len() + script_bytes.len());
        result.extend_from_slice(&body[..pos]);
        result.extend_from_slice(script_bytes);
        result.extend_from_slice(&body[pos..]);
        return result;
    }

    let mut result = Vec::with_capacity(body.len() + script_bytes.len());
    result.extend_from_slice(&body);
    result.extend_from_slice(script_bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_lands_before_closing_body_tag() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let injected = inject_hotreload(html, 35729);
        let text = String::from_utf8(injected).unwrap();
        let script_pos = text.find("WebSocket").unwrap();
        let body_pos = text.find("</body>").unwrap();
        assert!(script_pos < body_pos);
        assert!(text.contains(":35729"));
    }

    #[test]
    fn script_is_appended_without_body_tag() {
        let html = b"<p>fragment</p>".to_vec();
        let injected = inject_hotreload(html, 4000);
        let text = String::from_utf8(injected).unwrap();
        assert!(text.starts_with("<p>fragment</p>"));
        assert!(text.contains("WebSocket"));
    }
}
