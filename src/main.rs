use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use wellviz::config::HostConfig;
use wellviz::evaluation::{clamp, evaluate, scan, ViewQuery};
use wellviz::model::{shared_model, EnergyPredictor, RandomForest};
use wellviz::physics::EnergyCurve;

struct AppState {
    config: HostConfig,
    curve: EnergyCurve,
    model: Option<&'static RandomForest>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>1D Infinite Well</title>
    <style>
      html, body { margin: 0; padding: 0; background: #0b0c10; color: #e6e6e6; font-family: "Segoe UI", sans-serif; }
      main { display: grid; grid-template-columns: 300px 1fr; gap: 16px; padding: 16px; }
      #panel { background: #11151b; border: 1px solid #2a2f36; border-radius: 10px; padding: 12px; }
      #panel label { display: block; margin-top: 12px; font-size: 13px; }
      #panel input { width: 100%; }
      .metrics { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; }
      .metric { background: #11151b; border: 1px solid #2a2f36; border-radius: 10px; padding: 12px; }
      .metric .value { font-size: 24px; font-variant-numeric: tabular-nums; }
      .charts { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; margin-top: 12px; }
      canvas { width: 100%; height: 260px; background: #11151b; border: 1px solid #2a2f36; border-radius: 10px; }
      #energy { grid-column: 1 / span 2; }
      .note { color: #f0b429; font-size: 12px; min-height: 1em; }
    </style>
  </head>
  <body>
    <main>
      <div id="panel">
        <h3>Parameters</h3>
        <label>Well width L (nm): <span id="widthOut"></span><input id="width" type="range" /></label>
        <label>Level n: <span id="levelOut"></span><input id="level" type="range" /></label>
        <label>Samples: <span id="resolutionOut"></span><input id="resolution" type="range" /></label>
        <p class="note" id="note"></p>
        <p id="extra"></p>
      </div>
      <div>
        <div class="metrics">
          <div class="metric"><div>Predicted ground state (n=1)</div><div class="value" id="predicted">-</div><div>eV</div></div>
          <div class="metric"><div>Analytic ground state (n=1)</div><div class="value" id="analytic">-</div><div>eV</div></div>
        </div>
        <p id="deviation"></p>
        <div class="charts">
          <canvas id="psi" width="600" height="260"></canvas>
          <canvas id="prob" width="600" height="260"></canvas>
          <canvas id="energy" width="1200" height="260"></canvas>
        </div>
      </div>
    </main>
    <script>
      const $ = (id) => document.getElementById(id);

      function plot(canvas, xs, ys, title, xlabel) {
        const ctx = canvas.getContext("2d");
        const w = canvas.width, h = canvas.height, pad = 40;
        ctx.clearRect(0, 0, w, h);
        let ymin = Math.min(0, ...ys), ymax = Math.max(...ys);
        if (ymax === ymin) ymax = ymin + 1;
        const xmin = xs[0], xmax = xs[xs.length - 1];
        const px = (x) => pad + (x - xmin) / (xmax - xmin) * (w - 2 * pad);
        const py = (y) => h - pad - (y - ymin) / (ymax - ymin) * (h - 2 * pad);
        ctx.strokeStyle = "#2a2f36";
        ctx.beginPath();
        ctx.moveTo(pad, py(0)); ctx.lineTo(w - pad, py(0));
        ctx.moveTo(pad, pad); ctx.lineTo(pad, h - pad);
        ctx.stroke();
        ctx.strokeStyle = "#4fc3f7";
        ctx.lineWidth = 2;
        ctx.beginPath();
        xs.forEach((x, i) => i ? ctx.lineTo(px(x), py(ys[i])) : ctx.moveTo(px(x), py(ys[i])));
        ctx.stroke();
        ctx.fillStyle = "#e6e6e6";
        ctx.font = "13px sans-serif";
        ctx.fillText(title, pad, 20);
        ctx.fillText(xlabel, w - pad - 40, h - 10);
      }

      function setup(id, range) {
        const el = $(id);
        el.min = range.min; el.max = range.max; el.step = range.step; el.value = range.default;
        el.addEventListener("input", refresh);
      }

      async function refresh() {
        const width = $("width").value, level = $("level").value, resolution = $("resolution").value;
        $("widthOut").textContent = width;
        $("levelOut").textContent = level;
        $("resolutionOut").textContent = resolution;
        const res = await fetch(`/evaluate?width=${width}&level=${level}&resolution=${resolution}`);
        const data = await res.json();
        if (!res.ok) { $("note").textContent = data.error; return; }
        $("predicted").textContent = data.predicted_ground === null ? "-" : data.predicted_ground.toFixed(6);
        $("analytic").textContent = data.analytic_ground.toFixed(6);
        $("deviation").textContent = data.deviation === null ? ""
          : `Predicted - analytic: ${data.deviation.toFixed(6)} eV (${(100 * data.relative_deviation).toFixed(2)}%)`;
        $("note").textContent = data.note || "";
        $("extra").textContent = `E(n=${data.level}) = ${data.analytic_level.toFixed(6)} eV, nodes: ${data.nodes}, norm: ${data.normalization.toFixed(4)}`;
        plot($("psi"), data.x, data.psi, `Wavefunction psi(x) (n=${data.level})`, "x (nm)");
        plot($("prob"), data.x, data.probability, `Probability density |psi|^2 (n=${data.level})`, "x (nm)");
      }

      async function init() {
        const config = await (await fetch("/config")).json();
        setup("width", config.width);
        setup("level", config.level);
        setup("resolution", config.resolution);
        const curve = await (await fetch("/energy-curve")).json();
        plot($("energy"), curve.points.map((p) => p.width), curve.points.map((p) => p.energy),
             `Analytic energy vs well width (n=${curve.level})`, "L (nm)");
        refresh();
      }

      init();
    </script>
  </body>
</html>
"##;

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn config_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}

async fn energy_curve_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.curve.clone())
}

async fn evaluate_view(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let req = clamp(&q, &state.config);
    let model = state.model;
    let result = tokio::task::spawn_blocking(move || {
        evaluate(req, model.map(|m| m as &dyn EnergyPredictor))
    })
    .await;

    match result {
        Ok(Ok(out)) => Json(out).into_response(),
        Ok(Err(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
        Err(e) => {
            log::error!("evaluation task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: "evaluation failed".to_string() }),
            )
                .into_response()
        }
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/config", get(config_view))
        .route("/evaluate", get(evaluate_view))
        .route("/energy-curve", get(energy_curve_view))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = HostConfig::from_env();
    let curve = scan(&config)?;
    let model = match shared_model(&config.model_source).await {
        Ok(model) => Some(model),
        Err(e) => {
            log::warn!(
                "model unavailable ({}): {e}; serving analytic values only",
                config.model_source
            );
            None
        }
    };

    let addr = config.addr;
    let state = Arc::new(AppState { config, curve, model });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Serving on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
