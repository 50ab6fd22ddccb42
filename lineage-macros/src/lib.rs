use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Options accepted by `#[lineage::main]` and `#[lineage::test]`.
#[derive(Default)]
struct Options {
    /// Enable the process-wide context store before entering the runtime.
    context: bool,
}

impl Options {
    fn parse(attr: &TokenStream) -> Result<Self, String> {
        let mut options = Options::default();
        let attr = attr.to_string();

        for part in attr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "context" => options.context = true,
                other => return Err(format!("unknown lineage option `{other}`")),
            }
        }

        Ok(options)
    }

    fn prelude(&self) -> &'static str {
        if self.context {
            "::lineage::context::enable();"
        } else {
            ""
        }
    }
}

fn compile_error(message: &str) -> TokenStream {
    format!("compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}

/// Removes `async` and wraps the body of the function in `block_on`.
fn rewrite(item: TokenStream, options: &Options, tail: &str) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }

    let Some(pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return compile_error("expected a function body");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
            {prelude}
            let runtime = ::lineage::RuntimeBuilder::new().build();
            runtime
                .block_on(async move {{ {block} }}){tail}
        }}",
        prelude = options.prelude(),
    );

    let Ok(stream) = new_block.parse() else {
        return compile_error("failed to rewrite function body");
    };
    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));

    tokens.into_iter().collect()
}

/// Runs an `async fn main` on a lineage runtime.
///
/// `#[lineage::main(context)]` also enables the process-wide context store.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    match Options::parse(&attr) {
        Ok(options) => rewrite(item, &options, ""),
        Err(message) => compile_error(&message),
    }
}

/// Runs an `async` test on a fresh lineage runtime.
///
/// `#[lineage::test(context)]` also enables the process-wide context store.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = match Options::parse(&attr) {
        Ok(options) => options,
        Err(message) => return compile_error(&message),
    };

    let body = rewrite(item, &options, ";");

    let mut result: TokenStream = "#[::core::prelude::v1::test]"
        .parse()
        .unwrap_or_default();
    result.extend(body);
    result
}
