//! Embedded HTML/CSS/JS frontend for the scorelens web dashboard.
//!
//! The page is compiled into the binary as a string constant. Chart
//! configurations arrive ready-made from `/api/view`; the page only hands them
//! to Chart.js (loaded from a CDN together with the matrix plugin and the date
//! adapter) and wires up the filter form.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="zh">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>scorelens</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3.0.0/dist/chartjs-adapter-date-fns.bundle.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/chartjs-chart-matrix@2.0.1/dist/chartjs-chart-matrix.min.js"></script>
<style>
:root {
  --bg: #ffffff;
  --surface: #f7f8fa;
  --border: #dddddd;
  --text: #333333;
  --text-muted: #888888;
  --accent: #4a90e2;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
  transition: background 0.2s, color 0.2s;
}

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 20px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 22px; font-weight: 600; }
header .controls { display: flex; gap: 8px; }

button, select, input {
  font-family: var(--font);
  font-size: 13px;
  color: var(--text);
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 6px 10px;
}
button { cursor: pointer; }
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
button:hover { opacity: 0.85; }

.layout { display: grid; grid-template-columns: 280px 1fr; gap: 20px; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}
.card h2 { font-size: 15px; margin-bottom: 12px; }

.field { margin-bottom: 10px; }
.field label { display: block; font-size: 12px; color: var(--text-muted); margin-bottom: 4px; }
.field input { width: 100%; }
.field .pair { display: flex; gap: 6px; }
.field .pair input { width: 50%; }
.actions { display: flex; gap: 6px; flex-wrap: wrap; }

.saved-list { list-style: none; }
.saved-list li {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 4px 0;
  border-bottom: 1px solid var(--border);
}
.saved-list .name { cursor: pointer; color: var(--accent); }
.muted { color: var(--text-muted); font-size: 12px; }
.feedback { font-style: italic; color: var(--text-muted); }

nav.tabs { display: flex; gap: 4px; margin-bottom: 12px; }
nav.tabs button.active { background: var(--accent); border-color: var(--accent); color: #fff; }

.chart-box { position: relative; height: 420px; }
.no-data {
  display: none;
  height: 420px;
  align-items: center;
  justify-content: center;
  color: var(--text-muted);
  font-size: 16px;
}

.stats { display: grid; grid-template-columns: repeat(5, 1fr); gap: 10px; }
.stat { border-left: 4px solid var(--accent); padding: 6px 10px; background: var(--bg); }
.stat .label { font-size: 12px; color: var(--text-muted); }
.stat .value { font-size: 20px; font-weight: 600; }
.stat .range { font-size: 11px; color: var(--text-muted); }

.notices { position: fixed; top: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 20; }
.notice {
  min-width: 240px;
  max-width: 420px;
  padding: 10px 14px;
  border-radius: 6px;
  color: #fff;
  display: flex;
  justify-content: space-between;
  gap: 10px;
  box-shadow: 0 2px 8px rgba(0,0,0,0.2);
}
.notice.success { background: var(--green); }
.notice.info { background: var(--accent); }
.notice.error { background: var(--red); }
.notice button { background: none; border: none; color: #fff; padding: 0; }

.modal {
  display: none;
  position: fixed;
  inset: 0;
  background: rgba(0,0,0,0.45);
  align-items: center;
  justify-content: center;
  z-index: 10;
}
.modal.show { display: flex; }
.modal .body {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  width: 640px;
  max-height: 80vh;
  overflow-y: auto;
}
.modal table { width: 100%; border-collapse: collapse; margin-top: 8px; }
.modal th, .modal td { text-align: left; padding: 4px 6px; border-bottom: 1px solid var(--border); font-size: 13px; }
.modal td.num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1 id="page-title">scorelens</h1>
    <div class="controls">
      <button id="lang-toggle">EN</button>
      <button id="theme-toggle">◐</button>
    </div>
  </header>

  <div class="layout">
    <aside>
      <div class="card">
        <h2 id="filter-title"></h2>
        <form id="filter-form">
          <div class="field"><label data-label="keyword"></label><input name="keyword" type="text"></div>
          <div class="field">
            <label data-label="date_range"></label>
            <div class="pair"><input name="start_date" type="date"><input name="end_date" type="date"></div>
          </div>
          <div class="field">
            <label data-label="total_score"></label>
            <div class="pair">
              <input name="min_total_score" type="number" min="0" max="100" step="0.01">
              <input name="max_total_score" type="number" min="0" max="100" step="0.01">
            </div>
          </div>
          <div class="field"><label data-label="accuracy"></label><input name="min_accuracy_score" type="number" min="0" max="100" step="0.01"></div>
          <div class="field"><label data-label="completeness"></label><input name="min_completeness_score" type="number" min="0" max="100" step="0.01"></div>
          <div class="field"><label data-label="relevance"></label><input name="min_relevance_score" type="number" min="0" max="100" step="0.01"></div>
          <div class="field"><label data-label="clarity"></label><input name="min_clarity_score" type="number" min="0" max="100" step="0.01"></div>
          <div class="actions">
            <button type="submit" class="primary" data-label="apply"></button>
            <button type="button" id="reset-btn" data-label="reset"></button>
          </div>
        </form>
      </div>

      <div class="card">
        <div class="field">
          <label data-label="filter_name"></label>
          <input id="filter-name" type="text">
        </div>
        <div class="actions"><button type="button" id="save-btn" data-label="save"></button></div>
        <ul class="saved-list" id="saved-list"></ul>
      </div>

      <div class="card">
        <div class="field">
          <label data-label="detail_title"></label>
          <div class="pair"><input id="detail-id" type="text" placeholder="ID"><button type="button" id="detail-btn">→</button></div>
        </div>
      </div>
    </aside>

    <main>
      <div class="card">
        <nav class="tabs" id="tabs"></nav>
        <div class="chart-box"><canvas id="chart"></canvas></div>
        <div class="no-data" id="no-data"></div>
      </div>
      <div class="card">
        <h2 id="stats-title"></h2>
        <div class="muted" id="stats-count"></div>
        <div class="stats" id="stats"></div>
      </div>
    </main>
  </div>
</div>

<div class="notices" id="notices"></div>

<div class="modal" id="detail-modal">
  <div class="body" id="detail-body"></div>
</div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const state = {
  lang: null,
  theme: null,
  chart: null,
  filter: {},
};
let view = null;
let chart = null;

// Latest request sequence per kind; older responses are dropped.
const latest = { view: 0, filters: 0, detail: 0 };

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function guarded(kind, path, opts) {
  const seq = ++latest[kind];
  const res = await fetch(path, opts);
  const body = await res.json();
  if (seq !== latest[kind]) return { stale: true };
  if (!res.ok) throw new Error(body.detail || res.statusText);
  return { stale: false, body };
}

function query(extra) {
  const params = new URLSearchParams();
  if (state.lang) params.set('lang', state.lang);
  if (state.theme) params.set('theme', state.theme);
  if (state.chart) params.set('chart', state.chart);
  for (const [k, v] of Object.entries(Object.assign({}, state.filter, extra || {}))) {
    if (v !== '' && v !== null && v !== undefined) params.set(k, v);
  }
  return params.toString();
}

// Notices posted by the page itself (save/delete); the server's come with the view.
let localNotices = [];
let noticeSeq = 0;
function notify(level, message) {
  const id = 'local-' + (++noticeSeq);
  localNotices.push({ id, level, message });
  renderNotices();
  setTimeout(() => dismiss(id), 5000);
}

function dismiss(id) {
  localNotices = localNotices.filter(n => n.id !== id);
  if (view) view.notices = view.notices.filter(n => String(n.id) !== String(id));
  renderNotices();
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------
async function loadView() {
  try {
    const r = await guarded('view', '/api/view?' + query());
    if (r.stale) return;
    view = r.body;
    state.lang = view.lang;
    state.theme = view.theme;
    state.chart = view.active_chart;
    state.filter = view.filter || {};
    render();
    for (const n of view.notices) setTimeout(() => dismiss(n.id), 5000);
  } catch (e) {
    notify('error', e.message);
  }
}

async function saveFilter() {
  const name = document.getElementById('filter-name').value.trim();
  const L = view.labels;
  if (!name) { notify('error', L.save_failed); return; }
  try {
    const res = await fetch('/api/filters', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ name, filter_conditions: readForm() }),
    });
    const body = await res.json();
    if (!res.ok) throw new Error(body.detail);
    notify('success', L.save_success);
    document.getElementById('filter-name').value = '';
    loadView();
  } catch (e) {
    notify('error', L.save_failed + ': ' + e.message);
  }
}

async function deleteFilter(id) {
  const L = view.labels;
  try {
    const res = await fetch('/api/filters/' + encodeURIComponent(id), { method: 'DELETE' });
    const body = await res.json();
    if (!res.ok) throw new Error(body.detail);
    notify('success', L.delete_success);
    loadView();
  } catch (e) {
    notify('error', L.delete_failed + ': ' + e.message);
  }
}

async function loadSaved(id) {
  try {
    const r = await guarded('filters', '/api/filters');
    if (r.stale) return;
    const saved = r.body.filters.find(f => String(f.id) === String(id));
    if (!saved) throw new Error(view.labels.load_failed);
    state.filter = saved.conditions;
    await loadView();
    notify('success', view.labels.load_success);
  } catch (e) {
    notify('error', e.message);
  }
}

async function showDetail(id) {
  if (!id) return;
  try {
    const r = await guarded('detail', '/api/detail/' + encodeURIComponent(id) + '?' + query());
    if (r.stale) return;
    renderDetail(r.body);
  } catch (e) {
    notify('error', e.message);
  }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function render() {
  const L = view.labels;
  const P = view.palette;
  document.documentElement.lang = view.lang;
  document.title = view.title;
  document.getElementById('page-title').textContent = view.title;
  document.getElementById('lang-toggle').textContent = view.lang === 'zh' ? 'EN' : '中文';

  const root = document.documentElement.style;
  root.setProperty('--bg', P.background);
  root.setProperty('--text', P.text);
  root.setProperty('--border', P.border);
  root.setProperty('--surface', view.theme === 'dark' ? '#2a2a2a' : '#f7f8fa');

  document.querySelectorAll('[data-label]').forEach(el => {
    el.textContent = L[el.dataset.label] || '';
  });
  document.getElementById('filter-title').textContent = L.filter_title;
  document.getElementById('stats-title').textContent = view.summary.title;

  fillForm(view.filter);
  renderTabs();
  renderChart();
  renderStats();
  renderSaved();
  renderNotices();
}

function renderTabs() {
  document.getElementById('tabs').innerHTML = view.tabs.map(t =>
    `<button data-chart="${t.id}" class="${t.active ? 'active' : ''}">${esc(t.title)}</button>`
  ).join('');
}

function renderChart() {
  if (chart) { chart.destroy(); chart = null; }
  const slot = view.charts[view.active_chart];
  const canvas = document.getElementById('chart');
  const empty = document.getElementById('no-data');

  if (!slot || slot.state !== 'ready') {
    canvas.style.display = 'none';
    empty.style.display = 'flex';
    empty.textContent = slot ? slot.message : view.labels.no_data;
    return;
  }
  canvas.style.display = 'block';
  empty.style.display = 'none';

  const config = JSON.parse(JSON.stringify(slot.config));
  config.options.responsive = true;
  config.options.maintainAspectRatio = false;
  if (config.type === 'matrix') {
    const cols = config.options.scales.x.labels.length || 1;
    const rows = config.options.scales.y.labels.length || 1;
    for (const ds of config.data.datasets) {
      ds.width = ({ chart }) => ((chart.chartArea || {}).width || 0) / cols - 2;
      ds.height = ({ chart }) => ((chart.chartArea || {}).height || 0) / rows - 2;
    }
    config.options.plugins.tooltip = {
      callbacks: {
        title: items => config.options.scales.y.labels[items[0].raw.y],
        label: item => config.options.scales.x.labels[item.raw.x] + ': ' + item.raw.v.toFixed(2),
      },
    };
  }
  chart = new Chart(document.getElementById('chart'), config);
}

function renderStats() {
  const s = view.summary;
  document.getElementById('stats-count').textContent = view.labels.count + ': ' + s.count;
  document.getElementById('stats').innerHTML = s.rows.map(r => `
    <div class="stat" style="border-color:${r.color}">
      <div class="label">${esc(r.label)}</div>
      <div class="value">${r.mean.toFixed(2)}</div>
      <div class="range">${r.min.toFixed(2)} ~ ${r.max.toFixed(2)}</div>
    </div>
  `).join('');
}

function renderSaved() {
  const list = document.getElementById('saved-list');
  if (view.saved_filters.length === 0) {
    list.innerHTML = `<li class="muted">${esc(view.labels.no_filters)}</li>`;
    return;
  }
  list.innerHTML = view.saved_filters.map(f => `
    <li>
      <span class="name" data-load="${esc(String(f.id))}">${esc(f.name)}</span>
      <button type="button" data-delete="${esc(String(f.id))}">${esc(view.labels.delete)}</button>
    </li>
  `).join('');
}

function renderNotices() {
  const server = view ? view.notices : [];
  const all = server.concat(localNotices);
  document.getElementById('notices').innerHTML = all.map(n => `
    <div class="notice ${n.level}">
      <span>${esc(n.message)}</span>
      <button type="button" data-dismiss="${n.id}">✕</button>
    </div>
  `).join('');
}

function renderDetail(d) {
  const L = view.labels;
  const current = d.current.map(l =>
    `<tr><td>${esc(l.label)}</td><td class="num">${l.value}</td></tr>`).join('');
  let history;
  if (d.empty_history) {
    history = `<p class="muted">${esc(d.empty_history)}</p>`;
  } else {
    const heads = d.history[0].scores.map(s => `<th>${esc(s.label)}</th>`).join('');
    history = `<table><tr><th>${esc(L.date)}</th><th>${esc(L.total)}</th>${heads}</tr>` +
      d.history.map(h => `<tr><td>${esc(h.date)}</td><td class="num">${h.total}</td>` +
        h.scores.map(s => `<td class="num">${s.value}</td>`).join('') + '</tr>' +
        (h.feedback ? `<tr><td></td><td colspan="${h.scores.length + 1}" class="feedback">${esc(h.feedback)}</td></tr>` : '')
      ).join('') +
      '</table>';
  }
  document.getElementById('detail-body').innerHTML = `
    <h2>${esc(d.title)} #${esc(d.id)}</h2>
    <p class="muted">${esc(L.score_time)}: ${esc(d.created_at)}</p>
    <h3>${esc(d.current_title)}</h3>
    <table>${current}</table>
    ${d.feedback ? `<p class="feedback">${esc(d.feedback)}</p>` : ''}
    <h3>${esc(d.history_title)}</h3>
    ${history}
    <div class="actions" style="margin-top:12px"><button type="button" id="detail-close">${esc(L.close)}</button></div>
  `;
  document.getElementById('detail-modal').classList.add('show');
}

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------
function readForm() {
  const data = {};
  for (const [k, v] of new FormData(document.getElementById('filter-form')).entries()) {
    if (String(v).trim() !== '') data[k] = v;
  }
  return data;
}

function fillForm(filter) {
  const form = document.getElementById('filter-form');
  for (const input of form.querySelectorAll('input')) {
    const v = filter[input.name];
    input.value = v === undefined || v === null ? '' : v;
  }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------
document.getElementById('filter-form').addEventListener('submit', e => {
  e.preventDefault();
  state.filter = readForm();
  loadView();
});

document.getElementById('reset-btn').addEventListener('click', () => {
  state.filter = {};
  loadView();
});

document.getElementById('save-btn').addEventListener('click', saveFilter);

document.getElementById('detail-btn').addEventListener('click', () => {
  showDetail(document.getElementById('detail-id').value.trim());
});

document.getElementById('lang-toggle').addEventListener('click', () => {
  state.lang = state.lang === 'zh' ? 'en' : 'zh';
  loadView();
});

document.getElementById('theme-toggle').addEventListener('click', () => {
  state.theme = state.theme === 'dark' ? 'light' : 'dark';
  loadView();
});

document.getElementById('tabs').addEventListener('click', e => {
  const id = e.target.dataset.chart;
  if (!id || !view) return;
  state.chart = id;
  view.active_chart = id;
  view.tabs.forEach(t => t.active = t.id === id);
  renderTabs();
  renderChart();
});

document.getElementById('saved-list').addEventListener('click', e => {
  if (e.target.dataset.load) loadSaved(e.target.dataset.load);
  if (e.target.dataset.delete) deleteFilter(e.target.dataset.delete);
});

document.getElementById('notices').addEventListener('click', e => {
  if (e.target.dataset.dismiss) dismiss(e.target.dataset.dismiss);
});

document.getElementById('detail-modal').addEventListener('click', e => {
  if (e.target.id === 'detail-modal' || e.target.id === 'detail-close') {
    document.getElementById('detail-modal').classList.remove('show');
  }
});

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadView();
</script>
</body>
</html>"##;
