use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, PatType, Type};

fn unsupported_arg_msg(arg_pos: usize, fn_name: &str) -> String {
    format!(
        "Argument {} of builtin '{}' must be a plain `name: f64` parameter",
        arg_pos, fn_name
    )
}

/// Turns `fn name(a: f64, b: f64) -> Result<f64> { .. }` into a built-in taking
/// `&[f64]`, checking the argument count before binding the named parameters.
#[proc_macro_attribute]
pub fn builtin(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let fn_name = &input.sig.ident;
    let fn_args = &input.sig.inputs;
    let fn_body = &input.block;
    let fn_output = &input.sig.output;
    let name_str = fn_name.to_string();

    let mut arg_bindings = Vec::new();

    for (i, arg) in fn_args.iter().enumerate() {
        let (pat, ty) = match arg {
            FnArg::Typed(PatType { pat, ty, .. }) => (pat, ty),
            FnArg::Receiver(receiver) => {
                return syn::Error::new_spanned(receiver, unsupported_arg_msg(i, &name_str))
                    .to_compile_error()
                    .into();
            }
        };

        let arg_name = match **pat {
            syn::Pat::Ident(ref ident) => &ident.ident,
            _ => {
                return syn::Error::new_spanned(pat, unsupported_arg_msg(i, &name_str))
                    .to_compile_error()
                    .into();
            }
        };

        let is_f64 = match **ty {
            Type::Path(ref type_path) => type_path
                .path
                .segments
                .last()
                .map(|segment| segment.ident == "f64")
                .unwrap_or(false),
            _ => false,
        };
        if !is_f64 {
            return syn::Error::new_spanned(ty, unsupported_arg_msg(i, &name_str))
                .to_compile_error()
                .into();
        }

        arg_bindings.push(quote! {
            let #arg_name: f64 = args[#i];
        });
    }

    let args_len = arg_bindings.len();
    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(args: &[f64]) #fn_output {
            if args.len() != #args_len {
                return Err(crate::error::CalcError::arity(#name_str, #args_len, args.len()));
            }

            #(#arg_bindings)*

            #fn_body
        }
    };

    TokenStream::from(expanded)
}
