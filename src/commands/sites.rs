use jobharvest::config::{AdapterSpec, Config};

pub fn sites(config: &Config) {
    println!("Configured sites ({})", config.sites.len());
    println!("====================");

    for site in &config.sites {
        println!("{:<12} {:<22} {}", site.company.id, site.kind(), site.company.careers_url);
        if let Some(fallback) = &site.fallback {
            let filter = fallback
                .filter
                .as_ref()
                .map(|f| format!(" ({f:?})"))
                .unwrap_or_default();
            println!("{:<12} fallback: {}{filter}", "", describe(&fallback.adapter));
        }
    }
}

fn describe(adapter: &AdapterSpec) -> String {
    match adapter {
        AdapterSpec::HtmlCookiePaginated(spec) => {
            format!("html_cookie_paginated, links matching {}", spec.link_pattern)
        }
        AdapterSpec::StructuredFeed(spec) => {
            format!("structured_feed {}/{}/{}", spec.host, spec.tenant, spec.site)
        }
        AdapterSpec::RenderedPage(spec) => {
            format!("rendered_page, links matching {}", spec.link_pattern)
        }
    }
}
