use crate::dashboard::DashboardView;
use crate::models::{StatusKind, StatusMessage};
use crate::profile::{MAX_AGE, MIN_AGE, ProfileEditor};
use crate::sidebar::{SidebarCache, navigation};

pub fn render_page(title: &str, current_path: &str, sidebar: &SidebarCache, content: &str) -> String {
    LAYOUT_HTML
        .replace("{{TITLE}}", &escape(title))
        .replace("{{SIDEBAR}}", &render_sidebar(sidebar, current_path))
        .replace("{{CONTENT}}", content)
}

pub fn render_sidebar(cache: &SidebarCache, current_path: &str) -> String {
    let avatar = match &cache.avatar_url {
        Some(url) => format!(r#"<img src="{}" alt="Profile" />"#, escape(url)),
        None => r#"<span class="glyph" aria-hidden="true">&#128100;</span>"#.to_string(),
    };

    let links: String = navigation(current_path)
        .map(|(entry, active)| {
            format!(
                r#"<a href="{}" class="nav-link{}">{} <span>{}</span></a>"#,
                entry.path,
                if active { " active" } else { "" },
                entry.icon,
                entry.label
            )
        })
        .collect();

    format!(
        r#"<aside class="sidebar">
  <div class="identity">
    <div class="avatar small">{avatar}</div>
    <h2>{name}</h2>
  </div>
  <nav>
    {links}
    <form method="post" action="/logout"><button type="submit" class="logout">&#x21AA; <span>Logout</span></button></form>
  </nav>
</aside>"#,
        name = escape(cache.display_name()),
    )
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let stats: String = view
        .stats
        .iter()
        .map(|card| {
            format!(
                r#"<div class="stat {accent}"><div class="stat-head"><span class="icon">{icon}</span><h3>{title}</h3></div><p class="value">{value}</p><p class="trend">{trend}</p></div>"#,
                accent = card.accent,
                icon = card.icon,
                title = escape(card.title),
                value = escape(card.value),
                trend = escape(card.trend),
            )
        })
        .collect();

    let missions: String = view
        .missions
        .iter()
        .map(|mission| {
            format!(
                r#"<div class="row"><div><h3>{title}</h3><p class="muted">{points} points</p></div><div class="bar"><div style="width: {percent}%"></div></div></div>"#,
                title = escape(mission.title),
                points = mission.points,
                percent = mission.percent_complete(),
            )
        })
        .collect();

    let achievements: String = view
        .achievements
        .iter()
        .map(|entry| {
            format!(
                r#"<div class="row achievement"><span class="icon">&#127942;</span><div><h3>{title}</h3><p>{description}</p><p class="muted" title="{earned_on}">{when}</p></div></div>"#,
                title = escape(entry.title),
                description = escape(entry.description),
                earned_on = entry.earned_on,
                when = escape(&entry.when),
            )
        })
        .collect();

    format!(
        r#"<header><h1>&#127919; Welcome to BIS Arena</h1><p class="muted">{today}</p></header>
<section class="stats">{stats}</section>
<section class="columns">
  <div class="card"><h2>Daily Missions</h2>{missions}</div>
  <div class="card"><h2>Recent Achievements</h2>{achievements}</div>
</section>"#,
        today = view.today,
    )
}

pub fn render_hub(title: &str) -> String {
    format!(
        r#"<header><h1>{}</h1></header><div class="card"><p class="muted">Nothing here yet. Check back soon.</p></div>"#,
        escape(title)
    )
}

pub fn render_login(status: &StatusMessage) -> String {
    format!(
        r#"<header><h1>Sign in</h1><p class="muted">Paste the credentials issued by the BIS Arena auth service.</p></header>
{status}
<form class="card profile-form" method="post" action="/login">
  <label>Token<input type="password" name="token" required /></label>
  <label>Email<input type="email" name="email" required /></label>
  <label>Username<input type="text" name="username" /></label>
  <div class="actions"><button type="submit" class="primary">Continue</button></div>
</form>"#,
        status = render_status(status),
    )
}

pub fn render_profile(editor: &ProfileEditor) -> String {
    let status = render_status(editor.status());
    let Some(draft) = editor.draft().filter(|_| editor.is_loaded()) else {
        return format!(
            r#"<div class="loading"><div class="spinner" aria-label="Loading"></div>{status}</div>"#
        );
    };
    let profile = &draft.profile;
    let editing = editor.is_editing();
    let disabled = if editing { "" } else { " disabled" };

    let avatar = match editor.preview_url() {
        Some(url) => format!(r#"<img src="{}" alt="Profile" />"#, escape(url)),
        None => r#"<span class="glyph" aria-hidden="true">&#128100;</span>"#.to_string(),
    };

    let avatar_picker = if editing {
        r#"<div class="avatar-picker">
      <label class="camera">&#128247;<input type="file" name="profilePic" accept="image/*" /></label>
      <button type="submit" formaction="/profile/avatar" formnovalidate>Preview</button>
    </div>"#
    } else {
        ""
    };

    let passwords = if editing {
        r#"<fieldset class="passwords">
    <h3>Change Password</h3>
    <label>Current Password<input type="password" name="currentPassword" placeholder="Enter current password" /></label>
    <label>New Password<input type="password" name="newPassword" placeholder="Enter new password" /></label>
  </fieldset>"#
    } else {
        ""
    };

    let actions = if editing {
        let save = if editor.is_submitting() {
            r#"<button type="submit" class="primary" disabled>Saving...</button>"#
        } else {
            r#"<button type="submit" class="primary">Save Changes</button>"#
        };
        format!(
            r#"<button type="submit" formaction="/profile/cancel" formenctype="application/x-www-form-urlencoded" formnovalidate>Cancel</button>{save}"#
        )
    } else {
        r#"<button type="submit" formaction="/profile/edit" class="primary">Edit Profile</button>"#
            .to_string()
    };

    format!(
        r#"<header><h1>Profile Settings</h1><p class="muted">Manage your account settings and preferences</p></header>
{status}
<div class="card">
  <div class="avatar large">{avatar}</div>
  <form class="profile-form" method="post" action="/profile/save" enctype="multipart/form-data">
    {avatar_picker}
    <label>Username<input type="text" name="username" value="{username}"{disabled} /></label>
    <label>Email<input type="email" name="email" value="{email}"{disabled} /></label>
    <label>Age<input type="number" name="age" min="{MIN_AGE}" max="{MAX_AGE}" value="{age}"{disabled} /></label>
    <label>College<input type="text" name="college" value="{college}"{disabled} /></label>
    {passwords}
    <div class="actions">{actions}</div>
  </form>
</div>"#,
        username = escape(&profile.username),
        email = escape(&profile.email),
        age = profile.age.map(|age| age.to_string()).unwrap_or_default(),
        college = escape(profile.college.as_deref().unwrap_or_default()),
    )
}

fn render_status(status: &StatusMessage) -> String {
    if status.is_empty() {
        return String::new();
    }
    let (class, icon) = match status.kind {
        StatusKind::Success => ("success", "&#10004;"),
        _ => ("error", "&#9888;"),
    };
    format!(
        r#"<div class="status {class}" role="status">{icon} <p>{}</p></div>"#,
        escape(&status.text)
    )
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · BIS Arena</title>
  <style>
    :root {
      --indigo: #4f46e5;
      --purple: #9333ea;
      --pink: #ec4899;
      --ink: #1f2937;
      --muted: #6b7280;
      --glass: rgba(255, 255, 255, 0.12);
      --line: rgba(255, 255, 255, 0.2);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      font-family: "Inter", "Segoe UI", sans-serif;
      color: var(--ink);
      background: #f3f4f6;
    }

    .sidebar {
      position: fixed;
      inset: 0 auto 0 0;
      width: 16rem;
      background: linear-gradient(180deg, var(--indigo), var(--purple), var(--pink));
      border-right: 1px solid var(--line);
      color: white;
    }

    .identity {
      display: flex;
      align-items: center;
      gap: 1rem;
      padding: 1.5rem;
      border-bottom: 1px solid var(--line);
    }

    .identity h2 {
      margin: 0;
      font-size: 1.1rem;
      overflow: hidden;
      text-overflow: ellipsis;
      white-space: nowrap;
    }

    .avatar {
      border-radius: 50%;
      overflow: hidden;
      display: grid;
      place-items: center;
      background: rgba(168, 85, 247, 0.2);
    }

    .avatar img {
      width: 100%;
      height: 100%;
      object-fit: cover;
    }

    .avatar.small {
      width: 3rem;
      height: 3rem;
      box-shadow: 0 0 0 2px #d8b4fe;
    }

    .avatar.large {
      width: 8rem;
      height: 8rem;
      margin: 0 auto 1rem;
      border: 4px solid var(--line);
      font-size: 3rem;
    }

    nav {
      display: grid;
      gap: 0.5rem;
      padding: 1rem;
    }

    .nav-link,
    .logout {
      display: flex;
      gap: 0.75rem;
      padding: 0.75rem 1rem;
      border-radius: 0.5rem;
      color: rgba(255, 255, 255, 0.7);
      text-decoration: none;
    }

    .nav-link:hover {
      background: rgba(255, 255, 255, 0.1);
      color: white;
    }

    .nav-link.active {
      background: rgba(255, 255, 255, 0.2);
      color: white;
      box-shadow: 0 10px 20px rgba(0, 0, 0, 0.15);
    }

    .logout {
      width: 100%;
      border: 0;
      background: none;
      color: #fecaca;
      font: inherit;
      cursor: pointer;
    }

    main {
      margin-left: 16rem;
      padding: 2rem;
      max-width: 80rem;
    }

    h1 {
      margin: 0 0 0.5rem;
      font-size: 1.9rem;
      background: linear-gradient(90deg, var(--indigo), var(--pink));
      -webkit-background-clip: text;
      background-clip: text;
      color: transparent;
    }

    .muted {
      color: var(--muted);
      font-size: 0.875rem;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(12rem, 1fr));
      gap: 1rem;
      margin: 2rem 0;
    }

    .card,
    .stat {
      background: white;
      border-radius: 0.75rem;
      padding: 1.5rem;
      box-shadow: 0 1px 2px rgba(0, 0, 0, 0.06);
    }

    .stat-head {
      display: flex;
      align-items: center;
      gap: 0.75rem;
    }

    .stat h3 {
      margin: 0;
      font-size: 0.875rem;
      color: #4b5563;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      margin: 0.75rem 0 0;
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(22rem, 1fr));
      gap: 1.5rem;
    }

    .row {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 0.75rem;
      padding: 1rem;
      border-radius: 0.5rem;
    }

    .row h3 {
      margin: 0;
      font-size: 1rem;
    }

    .row p {
      margin: 0.25rem 0 0;
    }

    .achievement {
      justify-content: flex-start;
      align-items: flex-start;
    }

    .bar {
      width: 8rem;
      height: 0.5rem;
      background: #e5e7eb;
      border-radius: 999px;
    }

    .bar div {
      height: 100%;
      border-radius: 999px;
      background: linear-gradient(90deg, var(--indigo), var(--purple));
    }

    .status {
      display: flex;
      align-items: center;
      gap: 0.5rem;
      padding: 1rem;
      margin-bottom: 1.5rem;
      border-radius: 0.5rem;
    }

    .status p {
      margin: 0;
    }

    .status.error {
      background: #fef2f2;
      color: #b91c1c;
    }

    .status.success {
      background: #f0fdf4;
      color: #15803d;
    }

    .profile-form {
      display: grid;
      gap: 1.25rem;
    }

    .profile-form label {
      display: grid;
      gap: 0.5rem;
      font-size: 0.875rem;
      font-weight: 500;
    }

    .profile-form input {
      padding: 0.75rem;
      border: 1px solid #d1d5db;
      border-radius: 0.5rem;
      font: inherit;
    }

    .profile-form input:disabled {
      opacity: 0.5;
    }

    .passwords {
      display: grid;
      gap: 1.25rem;
      border: 0;
      border-top: 1px solid #e5e7eb;
      padding: 1.5rem 0 0;
    }

    .avatar-picker {
      display: flex;
      justify-content: center;
      gap: 0.5rem;
      margin-bottom: 1.5rem;
    }

    .actions {
      display: flex;
      justify-content: flex-end;
      gap: 1rem;
    }

    button {
      padding: 0.5rem 1.5rem;
      border: 0;
      border-radius: 0.5rem;
      background: #e5e7eb;
      font: inherit;
      cursor: pointer;
    }

    button.primary {
      background: var(--purple);
      color: white;
    }

    button:disabled {
      opacity: 0.5;
      cursor: not-allowed;
    }

    .loading {
      min-height: 60vh;
      display: grid;
      place-items: center;
      align-content: center;
      gap: 1.5rem;
    }

    .spinner {
      width: 2rem;
      height: 2rem;
      border: 3px solid #e9d5ff;
      border-top-color: var(--purple);
      border-radius: 50%;
      animation: spin 0.8s linear infinite;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  {{SIDEBAR}}
  <main>
    {{CONTENT}}
  </main>
</body>
</html>
"#;
