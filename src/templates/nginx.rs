use crate::domain::Domain;
use crate::settings::Settings;

/// Paths and patterns from the Moodle tree that must never be served.
pub const DENIED_PATTERNS: &[&str] = &[
    "/vendor/",
    "/node_modules/",
    "composer\\.json",
    "/readme",
    "/README",
    "readme\\.txt",
    "/upgrade\\.txt",
    "/UPGRADING\\.md",
    "db/install\\.xml",
    "/fixtures/",
    "/behat/",
    "phpunit\\.xml",
    "\\.lock",
    "environment\\.xml",
];

pub fn site_file_name(domain: &Domain) -> String {
    domain.as_str().to_string()
}

pub fn nginx_site(domain: &Domain, settings: &Settings) -> String {
    format!(
        r#"server {{
    listen 80;
    listen [::]:80;
    server_name {domain};

    root {web_root};
    index index.php index.html;
    client_max_body_size {body_size};

    location / {{
        try_files $uri $uri/ =404;
    }}

    # regex locations match in order; denials go before the php handler
    location ~ /\.(?!well-known) {{
        deny all;
        return 404;
    }}

    location ~ ({denied}) {{
        deny all;
        return 404;
    }}

    location ~ [^/]\.php(/|$) {{
        fastcgi_split_path_info ^(.+\.php)(/.+)$;
        fastcgi_index index.php;
        fastcgi_pass unix:{socket};
        include fastcgi_params;
        fastcgi_param PATH_INFO $fastcgi_path_info;
        fastcgi_param SCRIPT_FILENAME $document_root$fastcgi_script_name;
        fastcgi_read_timeout 300;
    }}

    location /dataroot/ {{
        internal;
        alias {data_root}/;
    }}
}}
"#,
        domain = domain,
        web_root = settings.web_root,
        body_size = settings.client_max_body_size,
        socket = settings.fpm_socket(),
        denied = DENIED_PATTERNS.join("|"),
        data_root = settings.data_root.trim_end_matches('/'),
    )
}
