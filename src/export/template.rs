//! Interactive rendering template (vis-network).
//!
//! Substitution points: `__ACCENT__`, `__EDGE__`, `__BG__` (style) and
//! `__NODES__`, `__EDGES__` (JSON literals).

pub const ACCENT: &str = "__ACCENT__";
pub const EDGE: &str = "__EDGE__";
pub const BACKGROUND: &str = "__BG__";
pub const NODES: &str = "__NODES__";
pub const EDGES: &str = "__EDGES__";

/// The renderer is loaded from this URL; exported files need network access for it
pub const VIS_NETWORK_URL: &str = "https://unpkg.com/vis-network@9.1.2/dist/vis-network.min.js";

pub const PAGE: &str = r##"<!doctype html>
<html lang="zh-CN">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width,initial-scale=1" />
<title>五老精神 动态系谱图</title>
<style>
  html,body { height:100%; margin:0; background: __BG__; background-size: cover; font-family: 'Noto Sans SC', 'Microsoft YaHei', Arial, sans-serif; color:#222; }
  #mynetwork { width:100%; height:100%; border-radius:8px; box-shadow: 0 14px 40px rgba(0,0,0,0.12); overflow:hidden; }
  .modal { position:fixed; right:18px; top:18px; width:360px; max-width:calc(100vw - 32px); background:#fff; padding:14px; border-radius:10px; box-shadow:0 12px 36px rgba(0,0,0,0.14); display:none; z-index:9999; border-left:4px solid __ACCENT__; }
  .modal img { width:110px; height:110px; border-radius:50%; object-fit:cover; border:4px solid __ACCENT__; box-shadow:0 10px 30px rgba(0,0,0,0.12); }
  .badge { display:inline-block; padding:4px 8px; margin:4px 4px 0 0; border-radius:10px; background:linear-gradient(90deg, __ACCENT__, __EDGE__); color:#fff; font-size:12px; }
</style>
<script src="https://unpkg.com/vis-network@9.1.2/dist/vis-network.min.js"></script>
</head>
<body>
  <div id="mynetwork"></div>
  <div class="modal" id="modalCard" aria-hidden="true">
    <div style="text-align:center">
      <img id="mAvatar" src="" alt="avatar"/>
      <h3 id="mName" style="margin:12px 0 6px;color:__ACCENT__"></h3>
    </div>
    <div id="mBio" style="font-size:14px;color:#222;line-height:1.6;max-height:260px;overflow:auto;"></div>
  </div>

<script>
  const nodesData = __NODES__;
  const edgesData = __EDGES__;
  const container = document.getElementById('mynetwork');
  const nodes = new vis.DataSet(nodesData);
  const edges = new vis.DataSet(edgesData);
  const data = { nodes: nodes, edges: edges };
  const options = {
    nodes: {
      shape: 'circularImage',
      size: 48,
      font: { size:14, color:'#222' },
      borderWidth: 2,
      color: { border: '__ACCENT__', background: '#fff' }
    },
    edges: {
      color: { color: '__EDGE__' },
      width: 2,
      smooth: { enabled:true, type:'dynamic' },
      font: { align: 'middle' }
    },
    interaction: { hover:true, navigationButtons:true, zoomView:true },
    physics: { enabled:true, barnesHut: { gravitationalConstant: -20000, springLength: 180, springConstant: 0.01 }, stabilization: { iterations: 250 } }
  };
  const network = new vis.Network(container, data, options);

  const modal = document.getElementById('modalCard');
  const mAvatar = document.getElementById('mAvatar');
  const mName = document.getElementById('mName');
  const mBio = document.getElementById('mBio');

  function escapeHtml(s) {
    return String(s).replace(/[&<>"']/g, function(c) {
      return { '&':'&amp;', '<':'&lt;', '>':'&gt;', '"':'&quot;', "'":'&#39;' }[c];
    });
  }

  network.on('click', function(params) {
    if (params.nodes.length > 0) {
      const id = params.nodes[0];
      const node = nodes.get(id);
      mAvatar.src = node.image || '';
      mName.innerText = node.label || id;
      mBio.innerHTML = (node.bio && node.bio.length > 0)
        ? String(node.bio).split(/\n|; /).map(escapeHtml).join('<br/>')
        : '<i style="color:#888">暂无详细信息</i>';
      modal.style.display = 'block';
    } else {
      modal.style.display = 'none';
    }
  });

  window.addEventListener('click', function(e) {
    if (!e.target.closest('.modal') && !e.target.closest('.vis-network')) {
      modal.style.display = 'none';
    }
  });

  network.once('stabilizationIterationsDone', function() {
    try {
      const ids = nodes.getIds();
      let i = 0;
      function step() {
        if (i >= ids.length) return;
        const nid = ids[i];
        const old = nodes.get(nid);
        nodes.update({ id: nid, size: (old.size || 48) * 1.18 });
        setTimeout(() => nodes.update({ id: nid, size: (old.size || 48) }), 650);
        i++;
        setTimeout(step, 90);
      }
      setTimeout(step, 200);
    } catch (e) { console.warn(e); }
  });
</script>
</body>
</html>
"##;
