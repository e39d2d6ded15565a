use crate::shell::Shell;
use crate::utils;
use crate::vars::VarStore;

// Prints its arguments. A run of tokens wrapped in literal `"` characters
// is printed verbatim with the quotes stripped and no substitution;
// otherwise tokens starting with `$` are substituted from the store.
pub fn run(shell: &mut Shell, args: &[String]) -> bool {
    match render(&args[1..], shell.vars()) {
        Ok(line) => println!("{}", line),
        Err(message) => utils::shell_error(message),
    }
    false
}

pub(crate) fn render(args: &[String], vars: &VarStore) -> Result<String, String> {
    if args.is_empty() {
        return Err("print: missing arguments".to_string());
    }
    let quoted = args[0].starts_with('"')
        && args
            .last()
            .map(|last| last.ends_with('"'))
            .unwrap_or(false);
    if quoted {
        let mut words = args.to_vec();
        if let Some(first) = words.first_mut() {
            first.remove(0);
        }
        if let Some(last) = words.last_mut() {
            last.pop();
        }
        return Ok(words.join(" "));
    }
    let words: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.starts_with('$') {
                vars.substitute(arg)
            } else {
                arg.clone()
            }
        })
        .collect();
    Ok(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::vars::VarStore;

    macro_rules! string_vec {
        ($($x:expr),*) => (vec![$($x.to_string()),*]);
    }

    #[test]
    fn no_arguments_is_an_error() {
        let vars = VarStore::new();
        assert!(render(&[], &vars).is_err());
    }

    #[test]
    fn substitutes_dollar_tokens() {
        let mut vars = VarStore::new();
        vars.set("NAME", "world");
        let args = string_vec!["hello", "$NAME"];
        assert_eq!(render(&args, &vars).unwrap(), "hello world");
    }

    #[test]
    fn quoted_text_is_substitution_free() {
        let mut vars = VarStore::new();
        vars.set("NAME", "world");
        let args = string_vec!["\"hello", "$NAME\""];
        assert_eq!(render(&args, &vars).unwrap(), "hello $NAME");
    }

    #[test]
    fn single_quoted_token() {
        let vars = VarStore::new();
        let args = string_vec!["\"hello\""];
        assert_eq!(render(&args, &vars).unwrap(), "hello");
    }

    #[test]
    fn unknown_variable_prints_as_is() {
        let vars = VarStore::new();
        let args = string_vec!["$MISSING"];
        assert_eq!(render(&args, &vars).unwrap(), "$MISSING");
    }
}
